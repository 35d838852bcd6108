//! Alert types and messages.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, BudgetSpending, BudgetStatus},
    database_id::DatabaseId,
};

/// Database identifier for a budget alert.
pub type AlertId = DatabaseId;

/// What a budget alert is warning about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// More than the budget has been spent.
    BudgetExceeded,
    /// Exactly the budget has been spent.
    BudgetLimitReached,
    /// Spending has passed the budget's alert threshold.
    BudgetAlmostExceeded,
    /// Spending has reached the alert threshold.
    ///
    /// Stored alerts may carry this type but new alerts are never raised with it.
    ThresholdReached,
}

impl AlertType {
    /// The alert to raise for a budget in `status`, if any.
    pub fn for_status(status: BudgetStatus) -> Option<Self> {
        match status {
            BudgetStatus::Exceeded => Some(AlertType::BudgetExceeded),
            BudgetStatus::LimitReached => Some(AlertType::BudgetLimitReached),
            BudgetStatus::AlmostExceeded => Some(AlertType::BudgetAlmostExceeded),
            BudgetStatus::OnTrack => None,
        }
    }

    /// The name stored in the database and used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::BudgetExceeded => "budget_exceeded",
            AlertType::BudgetLimitReached => "budget_limit_reached",
            AlertType::BudgetAlmostExceeded => "budget_almost_exceeded",
            AlertType::ThresholdReached => "threshold_reached",
        }
    }
}

impl Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget_exceeded" => Ok(AlertType::BudgetExceeded),
            "budget_limit_reached" => Ok(AlertType::BudgetLimitReached),
            "budget_almost_exceeded" => Ok(AlertType::BudgetAlmostExceeded),
            "threshold_reached" => Ok(AlertType::ThresholdReached),
            other => Err(Error::Validation(format!("Unknown alert type \"{other}\""))),
        }
    }
}

impl ToSql for AlertType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AlertType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A warning that a budget is close to or over its limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    /// The ID of the alert.
    pub id: AlertId,
    /// The user the alert is for.
    #[serde(skip)]
    pub user_id: UserID,
    /// The budget the alert is about.
    pub budget_id: BudgetId,
    /// The name of the budget, for display.
    pub budget_name: String,
    /// What the alert is warning about.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// A human readable description of the alert.
    pub message: String,
    /// How much had been spent when the alert was raised.
    pub current_spent: f64,
    /// The budget amount when the alert was raised.
    pub budget_amount: f64,
    /// The percentage of the budget spent when the alert was raised, not capped at 100.
    pub percentage: f64,
    /// Whether the user has acknowledged the alert.
    pub is_read: bool,
    /// When the alert was raised.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// An alert that is ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub budget_id: BudgetId,
    pub alert_type: AlertType,
    pub message: String,
    pub current_spent: f64,
    pub budget_amount: f64,
    pub percentage: f64,
}

impl NewAlert {
    /// An alert of `alert_type` for `budget`, using a snapshot of `spending`.
    pub fn for_budget(budget: &Budget, alert_type: AlertType, spending: &BudgetSpending) -> Self {
        Self {
            budget_id: budget.id,
            alert_type,
            message: alert_message(
                alert_type,
                &budget.name,
                spending.current_spent,
                budget.amount,
                spending.unclamped_percentage,
            ),
            current_spent: spending.current_spent,
            budget_amount: budget.amount,
            percentage: spending.unclamped_percentage,
        }
    }
}

/// The message shown to the user for an alert.
pub fn alert_message(
    alert_type: AlertType,
    budget_name: &str,
    spent: f64,
    amount: f64,
    percentage: f64,
) -> String {
    match alert_type {
        AlertType::BudgetExceeded => {
            format!("Budget \"{budget_name}\" has been exceeded! Spent {spent} out of {amount}")
        }
        AlertType::BudgetLimitReached => {
            format!("Budget \"{budget_name}\" has reached its limit! Spent {spent} out of {amount}")
        }
        AlertType::BudgetAlmostExceeded | AlertType::ThresholdReached => {
            format!("Budget \"{budget_name}\" is {percentage:.1}% used ({spent}/{amount})")
        }
    }
}
