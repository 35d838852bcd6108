//! Budget definitions and the validation applied before they are saved.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, auth::UserID, category::CategoryId, database_id::DatabaseId, date_range::DateRange,
};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// The alert threshold given to budgets created without one, as a percentage.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// How often the user thinks of the budget as repeating.
///
/// This is a label only. Spending is always measured over the budget's
/// start and end dates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// A budget for one week.
    Weekly,
    /// A budget for one month.
    #[default]
    Monthly,
    /// A budget for one year.
    Yearly,
}

impl BudgetPeriod {
    /// The name stored in the database and used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::Validation(format!("Unknown budget period \"{other}\""))),
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A spending limit for one expense category over a fixed window of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user who owns the budget.
    #[serde(skip)]
    pub user_id: UserID,
    /// A label for the budget, e.g. "Groceries in March".
    pub name: String,
    /// The most the user wants to spend over the whole window. Always positive.
    pub amount: f64,
    /// How often the user thinks of the budget as repeating.
    pub period: BudgetPeriod,
    /// The expense category the budget limits.
    pub category_id: CategoryId,
    /// The name of the category, for display.
    pub category_name: String,
    /// The first day of the budget, inclusive.
    pub start_date: Date,
    /// The last day of the budget, inclusive.
    pub end_date: Date,
    /// Inactive budgets are left out of the stats and never raise alerts.
    pub is_active: bool,
    /// Whether the budget may raise alerts.
    pub notifications: bool,
    /// The percentage of the budget at which it counts as almost exceeded.
    pub alert_threshold: f64,
    /// When the budget was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Budget {
    /// The days the budget covers.
    pub fn window(&self) -> DateRange {
        DateRange::new_unchecked(self.start_date, self.end_date)
    }
}

/// A validated budget that is ready to be saved.
///
/// The category has not been checked yet, the store does that.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// A trimmed, non-empty label.
    pub name: String,
    /// A positive, finite amount.
    pub amount: f64,
    /// How often the user thinks of the budget as repeating.
    pub period: BudgetPeriod,
    /// The expense category the budget limits.
    pub category_id: CategoryId,
    /// The days the budget covers.
    pub window: DateRange,
    /// Whether the budget counts towards stats and alerts.
    pub is_active: bool,
    /// Whether the budget may raise alerts.
    pub notifications: bool,
    /// A percentage between 0 and 100.
    pub alert_threshold: f64,
}

impl NewBudget {
    /// The same budget as `budget` before any changes.
    pub fn from_budget(budget: &Budget) -> Self {
        Self {
            name: budget.name.clone(),
            amount: budget.amount,
            period: budget.period,
            category_id: budget.category_id,
            window: budget.window(),
            is_active: budget.is_active,
            notifications: budget.notifications,
            alert_threshold: budget.alert_threshold,
        }
    }
}

/// The JSON body for creating or updating a budget.
///
/// When creating, `name`, `amount`, `categoryId`, `startDate` and `endDate`
/// are required. When updating, missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetForm {
    /// A label for the budget.
    pub name: Option<String>,
    /// The most the user wants to spend over the whole window.
    pub amount: Option<f64>,
    /// Defaults to monthly.
    pub period: Option<BudgetPeriod>,
    /// The expense category the budget limits.
    pub category_id: Option<CategoryId>,
    /// The first day of the budget.
    pub start_date: Option<Date>,
    /// The last day of the budget.
    pub end_date: Option<Date>,
    /// Defaults to true.
    pub is_active: Option<bool>,
    /// Defaults to true.
    pub notifications: Option<bool>,
    /// Defaults to [DEFAULT_ALERT_THRESHOLD].
    pub alert_threshold: Option<f64>,
}

impl BudgetForm {
    /// Validate a form for a new budget, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if a required field is missing or any
    /// field has an unacceptable value.
    pub fn into_new_budget(self) -> Result<NewBudget, Error> {
        let name = self
            .name
            .ok_or_else(|| Error::Validation("Budget name is required".to_owned()))?;
        let amount = self
            .amount
            .ok_or_else(|| Error::Validation("Amount is required".to_owned()))?;
        let category_id = self
            .category_id
            .ok_or_else(|| Error::Validation("Category is required".to_owned()))?;
        let start_date = self
            .start_date
            .ok_or_else(|| Error::Validation("Start date is required".to_owned()))?;
        let end_date = self
            .end_date
            .ok_or_else(|| Error::Validation("End date is required".to_owned()))?;

        Ok(NewBudget {
            name: validate_name(&name)?,
            amount: validate_amount(amount)?,
            period: self.period.unwrap_or_default(),
            category_id,
            window: DateRange::new(start_date, end_date)?,
            is_active: self.is_active.unwrap_or(true),
            notifications: self.notifications.unwrap_or(true),
            alert_threshold: validate_threshold(
                self.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
            )?,
        })
    }

    /// Apply the fields that are present to `budget`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if any given field has an unacceptable
    /// value, or if the new dates are out of order.
    pub fn apply_to(self, budget: &Budget) -> Result<NewBudget, Error> {
        let mut updated = NewBudget::from_budget(budget);

        if let Some(name) = self.name {
            updated.name = validate_name(&name)?;
        }
        if let Some(amount) = self.amount {
            updated.amount = validate_amount(amount)?;
        }
        if let Some(period) = self.period {
            updated.period = period;
        }
        if let Some(category_id) = self.category_id {
            updated.category_id = category_id;
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            updated.window = DateRange::new(
                self.start_date.unwrap_or(budget.start_date),
                self.end_date.unwrap_or(budget.end_date),
            )?;
        }
        if let Some(is_active) = self.is_active {
            updated.is_active = is_active;
        }
        if let Some(notifications) = self.notifications {
            updated.notifications = notifications;
        }
        if let Some(alert_threshold) = self.alert_threshold {
            updated.alert_threshold = validate_threshold(alert_threshold)?;
        }

        Ok(updated)
    }
}

fn validate_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        Err(Error::Validation("Budget name is required".to_owned()))
    } else {
        Ok(name.to_owned())
    }
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::Validation("Amount must be positive".to_owned()))
    }
}

fn validate_threshold(alert_threshold: f64) -> Result<f64, Error> {
    if (0.0..=100.0).contains(&alert_threshold) {
        Ok(alert_threshold)
    } else {
        Err(Error::Validation(
            "Alert threshold must be between 0 and 100".to_owned(),
        ))
    }
}
