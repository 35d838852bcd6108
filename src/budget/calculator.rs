//! Measures a budget's spending against the part of the budget that falls in a date window.
//!
//! Everything here is pure. The caller sums the expenses for
//! [spending_window] and passes the total in.

use serde::Serialize;
use time::Date;

use crate::{budget::Budget, date_range::DateRange};

/// How close two percentages must be to count as equal.
pub const PERCENTAGE_EPSILON: f64 = 1e-9;

/// How much of a budget has been used, from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Spending is below the alert threshold.
    OnTrack,
    /// Spending is at or above the alert threshold but below the budget.
    AlmostExceeded,
    /// Spending is exactly the budget.
    LimitReached,
    /// Spending is over the budget.
    Exceeded,
}

impl BudgetStatus {
    /// Classify an unclamped `percentage` of the budget spent.
    ///
    /// Exactly 100% is checked before the threshold, so a threshold of 100
    /// never yields [BudgetStatus::AlmostExceeded] for a fully spent budget.
    pub fn classify(percentage: f64, alert_threshold: f64) -> Self {
        if percentage > 100.0 + PERCENTAGE_EPSILON {
            BudgetStatus::Exceeded
        } else if (percentage - 100.0).abs() <= PERCENTAGE_EPSILON {
            BudgetStatus::LimitReached
        } else if percentage >= alert_threshold {
            BudgetStatus::AlmostExceeded
        } else {
            BudgetStatus::OnTrack
        }
    }
}

/// Where today falls relative to a budget's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStatus {
    /// The budget has not started yet.
    Upcoming,
    /// Today is within the budget's dates.
    Current,
    /// The budget has ended.
    Expired,
}

impl DateStatus {
    /// The status of `window` on `today`.
    pub fn of(window: DateRange, today: Date) -> Self {
        if today < window.start() {
            DateStatus::Upcoming
        } else if today > window.end() {
            DateStatus::Expired
        } else {
            DateStatus::Current
        }
    }
}

/// A budget's spending over some window of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSpending {
    /// The total of the budget category's expenses in the window.
    pub current_spent: f64,
    /// The share of the budget amount for the days in the window.
    pub proportional_budget: f64,
    /// How much of the proportional budget has been spent, capped at 100.
    pub percentage: f64,
    /// The percentage before capping. Used for classification and alerts.
    #[serde(skip)]
    pub unclamped_percentage: f64,
    /// How much of the proportional budget is left, never negative.
    pub remaining: f64,
    /// The budget's status over the window.
    pub status: BudgetStatus,
    /// The first day spending was counted from.
    pub query_start_date: Date,
    /// The last day spending was counted to.
    pub query_end_date: Date,
}

/// The days over which to count spending for `budget_window`.
///
/// This is the budget's own window when there is no query window, otherwise
/// the days common to both. Returns `None` if the windows do not overlap.
pub fn spending_window(budget_window: DateRange, query: Option<DateRange>) -> Option<DateRange> {
    match query {
        Some(query) => budget_window.intersection(&query),
        None => Some(budget_window),
    }
}

/// Measure `current_spent` against `budget`, optionally limited to `query`.
///
/// `current_spent` must be the total of the budget category's expenses over
/// [spending_window] for the same budget and query.
/// Returns `None` if the budget is outside the query window.
pub fn calculate_spending(
    budget: &Budget,
    query: Option<DateRange>,
    current_spent: f64,
) -> Option<BudgetSpending> {
    let window = spending_window(budget.window(), query)?;

    let proportional_budget = match query {
        Some(_) => budget.amount * window.days() as f64 / budget.window().days() as f64,
        None => budget.amount,
    };

    let unclamped_percentage = if proportional_budget > 0.0 {
        current_spent / proportional_budget * 100.0
    } else {
        0.0
    };

    Some(BudgetSpending {
        current_spent,
        proportional_budget,
        percentage: unclamped_percentage.min(100.0),
        unclamped_percentage,
        remaining: (proportional_budget - current_spent).max(0.0),
        status: BudgetStatus::classify(unclamped_percentage, budget.alert_threshold),
        query_start_date: window.start(),
        query_end_date: window.end(),
    })
}
