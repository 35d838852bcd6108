//! Core expense and income types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, CategoryRef},
    database_id::DatabaseId,
};

/// Database identifier for an expense or income.
pub type TransactionId = DatabaseId;

/// Whether money was spent or earned.
///
/// Categories are also split by kind, and a transaction may only use a
/// category of its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl TransactionKind {
    /// The name stored in the database and used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::Validation(format!(
                "Unknown transaction kind \"{other}\""
            ))),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    #[serde(skip)]
    pub user_id: UserID,
    /// Whether this is an expense or an income.
    pub kind: TransactionKind,
    /// When the money was spent or earned.
    pub date: Date,
    /// The category the transaction is filed under.
    pub category_id: CategoryId,
    /// The name of the category, for display.
    pub category_name: String,
    /// How much money was spent or earned.
    pub amount: f64,
    /// An optional free text note.
    pub note: Option<String>,
}

/// A validated transaction that is ready to be saved.
///
/// The category must already have been resolved to one owned by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether this is an expense or an income.
    pub kind: TransactionKind,
    /// When the money was spent or earned.
    pub date: Date,
    /// The category the transaction is filed under.
    pub category_id: CategoryId,
    /// How much money was spent or earned.
    pub amount: f64,
    /// An optional free text note.
    pub note: Option<String>,
}

/// The JSON body for creating an expense or income.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    /// When the money was spent or earned.
    pub date: Option<Date>,
    /// The category, either by ID or by name.
    pub category: Option<CategoryRef>,
    /// How much money was spent or earned.
    pub amount: Option<f64>,
    /// An optional free text note.
    pub note: Option<String>,
}

/// The JSON body for updating an expense or income. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    /// When the money was spent or earned.
    pub date: Option<Date>,
    /// The category, either by ID or by name.
    pub category: Option<CategoryRef>,
    /// How much money was spent or earned.
    pub amount: Option<f64>,
    /// An optional free text note.
    pub note: Option<String>,
}

/// Check that `amount` is a usable number of dollars.
pub(crate) fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(Error::Validation("Amount must be a number".to_owned()))
    }
}

/// Trim the note and drop it if nothing is left.
pub(crate) fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|note| note.trim().to_owned())
        .filter(|note| !note.is_empty())
}

/// Totals for one category in a [TransactionStats] summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// The category being summarised.
    pub category_id: CategoryId,
    /// The name of the category, for display.
    pub category_name: String,
    /// The sum of the transaction amounts.
    pub total: f64,
    /// The number of transactions.
    pub count: i64,
}

/// Summary statistics for a user's expenses or incomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    /// Per category totals, largest total first.
    pub categories: Vec<CategoryTotal>,
    /// The sum of all amounts.
    pub total: f64,
    /// The number of transactions.
    pub count: i64,
    /// The mean amount, or zero when there are no transactions.
    pub average: f64,
}
