//! Savings goal types and validation.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID, database_id::DatabaseId};

/// Database identifier for a savings goal.
pub type GoalId = DatabaseId;

/// How important a savings goal is to the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl GoalPriority {
    /// The name stored in the database and used in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => "low",
            GoalPriority::Medium => "medium",
            GoalPriority::High => "high",
        }
    }
}

impl Display for GoalPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GoalPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(GoalPriority::Low),
            "medium" => Ok(GoalPriority::Medium),
            "high" => Ok(GoalPriority::High),
            other => Err(Error::Validation(format!("Unknown priority \"{other}\""))),
        }
    }
}

impl ToSql for GoalPriority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GoalPriority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An amount of money the user wants to have saved by a deadline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: GoalId,
    #[serde(skip)]
    pub user_id: UserID,
    pub name: String,
    /// How much the user wants to save. Always positive.
    pub target_amount: f64,
    pub deadline: Date,
    pub priority: GoalPriority,
    pub description: Option<String>,
    /// How much has been saved so far. Never negative.
    pub saved_amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated savings goal that is ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_amount: f64,
    pub deadline: Date,
    pub priority: GoalPriority,
    pub description: Option<String>,
    pub saved_amount: f64,
}

impl NewSavingsGoal {
    /// The same goal as `goal` before any changes.
    pub fn from_goal(goal: &SavingsGoal) -> Self {
        Self {
            name: goal.name.clone(),
            target_amount: goal.target_amount,
            deadline: goal.deadline,
            priority: goal.priority,
            description: goal.description.clone(),
            saved_amount: goal.saved_amount,
        }
    }
}

/// The JSON body for creating or updating a savings goal.
///
/// When creating, `name`, `targetAmount` and `deadline` are required.
/// When updating, missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoalForm {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<Date>,
    /// Defaults to medium.
    pub priority: Option<GoalPriority>,
    pub description: Option<String>,
    /// Defaults to zero.
    pub saved_amount: Option<f64>,
}

impl SavingsGoalForm {
    /// Validate a form for a new goal, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if a required field is missing or a value is out of range.
    pub fn into_new_goal(self) -> Result<NewSavingsGoal, Error> {
        let name = self
            .name
            .ok_or_else(|| Error::Validation("Goal name is required".to_owned()))?;
        let target_amount = self
            .target_amount
            .ok_or_else(|| Error::Validation("Target amount is required".to_owned()))?;
        let deadline = self
            .deadline
            .ok_or_else(|| Error::Validation("Deadline is required".to_owned()))?;

        Ok(NewSavingsGoal {
            name: validate_name(&name)?,
            target_amount: validate_target_amount(target_amount)?,
            deadline,
            priority: self.priority.unwrap_or_default(),
            description: normalize_description(self.description),
            saved_amount: validate_saved_amount(self.saved_amount.unwrap_or(0.0))?,
        })
    }

    /// Apply the fields that are present to `goal`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if any given value is out of range.
    pub fn apply_to(self, goal: &SavingsGoal) -> Result<NewSavingsGoal, Error> {
        let mut updated = NewSavingsGoal::from_goal(goal);

        if let Some(name) = self.name {
            updated.name = validate_name(&name)?;
        }
        if let Some(target_amount) = self.target_amount {
            updated.target_amount = validate_target_amount(target_amount)?;
        }
        if let Some(deadline) = self.deadline {
            updated.deadline = deadline;
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if self.description.is_some() {
            updated.description = normalize_description(self.description);
        }
        if let Some(saved_amount) = self.saved_amount {
            updated.saved_amount = validate_saved_amount(saved_amount)?;
        }

        Ok(updated)
    }
}

/// The JSON body for setting how much has been saved towards a goal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAmountForm {
    pub saved_amount: f64,
}

fn validate_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        Err(Error::Validation("Goal name is required".to_owned()))
    } else {
        Ok(name.to_owned())
    }
}

fn validate_target_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::Validation("Target amount must be positive".to_owned()))
    }
}

pub(crate) fn validate_saved_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::Validation(
            "Saved amount cannot be negative".to_owned(),
        ))
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|description| description.trim().to_owned())
        .filter(|description| !description.is_empty())
}
