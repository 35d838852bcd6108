//! Budgets and how much of them has been spent.
//!
//! A budget limits spending in one expense category over a fixed window of
//! days. [calculate_spending] measures a budget against the expenses in the
//! part of its window that overlaps an optional query window, prorating the
//! budget amount by the number of days. [measure_budgets] and
//! [build_stats_report] apply it across all of a user's budgets.

mod aggregator;
mod calculator;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod get;
mod list;
mod stats;

pub use aggregator::{
    BudgetStatsReport, BudgetWithSpending, OverallStats, build_stats_report, measure_budgets,
};
pub use calculator::{
    BudgetSpending, BudgetStatus, DateStatus, PERCENTAGE_EPSILON, calculate_spending,
    spending_window,
};
pub use create::create_budget_endpoint;
pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, list_active_budgets,
    list_budgets, list_notifying_budgets, update_budget,
};
pub use delete::delete_budget_endpoint;
pub use domain::{
    Budget, BudgetForm, BudgetId, BudgetPeriod, DEFAULT_ALERT_THRESHOLD, NewBudget,
};
pub use edit::edit_budget_endpoint;
pub use get::get_budget_endpoint;
pub use list::list_budgets_endpoint;
pub use stats::budget_stats_endpoint;
