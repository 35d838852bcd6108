//! Applies the spending calculator across a user's budgets and rolls up the totals.

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    budget::{
        Budget,
        calculator::{BudgetSpending, BudgetStatus, DateStatus, calculate_spending, spending_window},
    },
    date_range::DateRange,
};

/// A budget together with its spending over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetWithSpending {
    /// The budget being measured.
    #[serde(flatten)]
    pub budget: Budget,
    /// The budget's spending over the window.
    #[serde(flatten)]
    pub spending: BudgetSpending,
    /// Where today falls relative to the budget's own dates.
    pub date_status: DateStatus,
}

/// Totals across all measured budgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    /// The sum of the proportional budgets.
    pub total_budget: f64,
    /// The sum of the amounts spent.
    pub total_spent: f64,
    /// How much of the total budget is left, never negative.
    pub total_remaining: f64,
    /// How much of the total budget has been spent, capped at 100.
    pub overall_percentage: f64,
    /// The number of budgets counted in the totals.
    pub active_budgets: usize,
    /// The number of budgets that are [BudgetStatus::OnTrack].
    pub on_track_budgets: usize,
    /// The number of budgets that are [BudgetStatus::AlmostExceeded].
    pub almost_exceeded_budgets: usize,
    /// The number of budgets that are [BudgetStatus::LimitReached].
    pub limit_reached_budgets: usize,
    /// The number of budgets that are [BudgetStatus::Exceeded].
    pub exceeded_budgets: usize,
}

/// The response for the budget stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatsReport {
    /// Each budget counted in the totals.
    pub budget_stats: Vec<BudgetWithSpending>,
    /// The totals.
    pub overall_stats: OverallStats,
}

/// Measure each budget's spending over `query`, or over its own dates if there is no query.
///
/// `spent_in` is called with each budget and the window to sum its expenses over.
/// Budgets that do not overlap `query` are left out. The order of `budgets` is kept.
///
/// # Errors
///
/// Returns the first error returned by `spent_in`.
pub fn measure_budgets<F>(
    budgets: Vec<Budget>,
    query: Option<DateRange>,
    today: Date,
    mut spent_in: F,
) -> Result<Vec<BudgetWithSpending>, Error>
where
    F: FnMut(&Budget, DateRange) -> Result<f64, Error>,
{
    let mut measured = Vec::with_capacity(budgets.len());

    for budget in budgets {
        let Some(window) = spending_window(budget.window(), query) else {
            continue;
        };

        let current_spent = spent_in(&budget, window)?;

        let Some(spending) = calculate_spending(&budget, query, current_spent) else {
            continue;
        };

        let date_status = DateStatus::of(budget.window(), today);

        measured.push(BudgetWithSpending {
            budget,
            spending,
            date_status,
        });
    }

    Ok(measured)
}

/// Roll up the totals for `budget_stats`.
///
/// Budgets with a proportional budget of zero or less are dropped first.
pub fn build_stats_report(budget_stats: Vec<BudgetWithSpending>) -> BudgetStatsReport {
    let budget_stats: Vec<BudgetWithSpending> = budget_stats
        .into_iter()
        .filter(|budget| budget.spending.proportional_budget > 0.0)
        .collect();

    let total_budget: f64 = budget_stats
        .iter()
        .map(|budget| budget.spending.proportional_budget)
        .sum();
    let total_spent: f64 = budget_stats
        .iter()
        .map(|budget| budget.spending.current_spent)
        .sum();
    let overall_percentage = if total_budget > 0.0 {
        (total_spent / total_budget * 100.0).min(100.0)
    } else {
        0.0
    };
    let count_status = |status: BudgetStatus| {
        budget_stats
            .iter()
            .filter(|budget| budget.spending.status == status)
            .count()
    };

    let overall_stats = OverallStats {
        total_budget,
        total_spent,
        total_remaining: (total_budget - total_spent).max(0.0),
        overall_percentage,
        active_budgets: budget_stats.len(),
        on_track_budgets: count_status(BudgetStatus::OnTrack),
        almost_exceeded_budgets: count_status(BudgetStatus::AlmostExceeded),
        limit_reached_budgets: count_status(BudgetStatus::LimitReached),
        exceeded_budgets: count_status(BudgetStatus::Exceeded),
    };

    BudgetStatsReport {
        budget_stats,
        overall_stats,
    }
}

#[cfg(test)]
mod aggregator_tests {
    use std::collections::HashMap;

    use time::{Date, OffsetDateTime, macros::date};

    use crate::{
        Error,
        auth::UserID,
        budget::{Budget, BudgetId, BudgetPeriod, calculator::DateStatus},
        date_range::DateRange,
    };

    use super::{build_stats_report, measure_budgets};

    fn budget(id: BudgetId, amount: f64, start: Date, end: Date) -> Budget {
        Budget {
            id,
            user_id: UserID::new(1),
            name: format!("Budget {id}"),
            amount,
            period: BudgetPeriod::Monthly,
            category_id: id,
            category_name: "Groceries".to_owned(),
            start_date: start,
            end_date: end,
            is_active: true,
            notifications: true,
            alert_threshold: 80.0,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn january(id: BudgetId, amount: f64) -> Budget {
        budget(id, amount, date!(2024 - 01 - 01), date!(2024 - 01 - 31))
    }

    fn february(id: BudgetId, amount: f64) -> Budget {
        budget(id, amount, date!(2024 - 02 - 01), date!(2024 - 02 - 29))
    }

    fn fixed_spending(
        spent: HashMap<BudgetId, f64>,
    ) -> impl FnMut(&Budget, DateRange) -> Result<f64, Error> {
        move |budget, _| Ok(spent.get(&budget.id).copied().unwrap_or(0.0))
    }

    #[test]
    fn totals_sum_over_budgets_and_count_statuses() {
        let budgets = vec![january(1, 100.0), january(2, 100.0), january(3, 100.0)];
        let spent = HashMap::from([(1, 50.0), (2, 100.0), (3, 120.0)]);

        let measured =
            measure_budgets(budgets, None, date!(2024 - 01 - 15), fixed_spending(spent)).unwrap();
        let report = build_stats_report(measured);

        let stats = report.overall_stats;
        assert_eq!(stats.total_budget, 300.0);
        assert_eq!(stats.total_spent, 270.0);
        assert_eq!(stats.total_remaining, 30.0);
        assert_eq!(stats.overall_percentage, 90.0);
        assert_eq!(stats.active_budgets, 3);
        assert_eq!(stats.on_track_budgets, 1);
        assert_eq!(stats.almost_exceeded_budgets, 0);
        assert_eq!(stats.limit_reached_budgets, 1);
        assert_eq!(stats.exceeded_budgets, 1);
    }

    #[test]
    fn overall_percentage_is_capped() {
        let spent = HashMap::from([(1, 500.0)]);

        let measured = measure_budgets(
            vec![january(1, 100.0)],
            None,
            date!(2024 - 01 - 15),
            fixed_spending(spent),
        )
        .unwrap();
        let report = build_stats_report(measured);

        assert_eq!(report.overall_stats.overall_percentage, 100.0);
        assert_eq!(report.overall_stats.total_remaining, 0.0);
    }

    #[test]
    fn query_window_excludes_budgets_outside_it() {
        let query = DateRange::new(date!(2024 - 02 - 10), date!(2024 - 02 - 20)).unwrap();
        let mut asked_for = Vec::new();

        let measured = measure_budgets(
            vec![january(1, 100.0), february(2, 290.0)],
            Some(query),
            date!(2024 - 02 - 15),
            |budget, window| {
                asked_for.push((budget.id, window));
                Ok(10.0)
            },
        )
        .unwrap();

        assert_eq!(measured.len(), 1);
        assert_eq!(measured[0].budget.id, 2);
        assert_eq!(asked_for, vec![(2, query)]);
        assert!((measured[0].spending.proportional_budget - 110.0).abs() < 1e-9);
    }

    #[test]
    fn no_budgets_gives_zero_totals() {
        let report = build_stats_report(Vec::new());

        assert!(report.budget_stats.is_empty());
        assert_eq!(report.overall_stats.total_budget, 0.0);
        assert_eq!(report.overall_stats.overall_percentage, 0.0);
        assert_eq!(report.overall_stats.active_budgets, 0);
    }

    #[test]
    fn date_status_uses_today() {
        let measured = measure_budgets(
            vec![january(1, 100.0), february(2, 100.0)],
            None,
            date!(2024 - 01 - 20),
            |_, _| Ok(0.0),
        )
        .unwrap();

        assert_eq!(measured[0].date_status, DateStatus::Current);
        assert_eq!(measured[1].date_status, DateStatus::Upcoming);
    }

    #[test]
    fn spending_errors_are_returned() {
        let result = measure_budgets(
            vec![january(1, 100.0)],
            None,
            date!(2024 - 01 - 20),
            |_, _| Err(Error::DatabaseLockError),
        );

        assert_eq!(result, Err(Error::DatabaseLockError));
    }

    #[test]
    fn serializes_budget_and_spending_fields_side_by_side() {
        let measured = measure_budgets(
            vec![january(1, 100.0)],
            None,
            date!(2024 - 01 - 20),
            |_, _| Ok(85.0),
        )
        .unwrap();

        let json = serde_json::to_value(&measured[0]).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["currentSpent"], 85.0);
        assert_eq!(json["status"], "almost_exceeded");
        assert_eq!(json["dateStatus"], "current");
        assert_eq!(json["queryStartDate"], "2024-01-01");
        assert!(json.get("unclampedPercentage").is_none());
        assert!(json.get("userId").is_none());
    }
}
