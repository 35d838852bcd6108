//! The API endpoints URIs.
//!
//! Paths with a parameter, e.g. '/api/budgets/{budget_id}', are filled in by the router. Tests use
//! `format_endpoint` to build them.

/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route for logging in.
pub const LOG_IN: &str = "/api/log_in";
/// The route for logging out.
pub const LOG_OUT: &str = "/api/log_out";

/// The route for listing and creating budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route for getting, updating and deleting a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route for the spending summary across all active budgets.
pub const BUDGET_STATS: &str = "/api/budgets/stats";
/// The route that checks every budget and raises any new alerts.
pub const CHECK_BUDGET_ALERTS: &str = "/api/budgets/alerts/check";
/// The route for listing budget alerts.
pub const BUDGET_ALERTS: &str = "/api/budgets/alerts";
/// The route for acknowledging a budget alert.
pub const MARK_BUDGET_ALERT_READ: &str = "/api/budgets/alerts/{alert_id}/read";

/// The route for listing and creating expense categories.
pub const EXPENSE_CATEGORIES: &str = "/api/expense_categories";
/// The route for deleting an expense category.
pub const EXPENSE_CATEGORY: &str = "/api/expense_categories/{category_id}";
/// The route for listing and creating income categories.
pub const INCOME_CATEGORIES: &str = "/api/income_categories";
/// The route for deleting an income category.
pub const INCOME_CATEGORY: &str = "/api/income_categories/{category_id}";

/// The route for listing and creating expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for getting, updating and deleting a single expense.
pub const EXPENSE: &str = "/api/expenses/{transaction_id}";
/// The route for expense totals grouped by category.
pub const EXPENSE_STATS: &str = "/api/expenses/stats";
/// The route for listing and creating incomes.
pub const INCOMES: &str = "/api/incomes";
/// The route for getting, updating and deleting a single income.
pub const INCOME: &str = "/api/incomes/{transaction_id}";
/// The route for income totals grouped by category.
pub const INCOME_STATS: &str = "/api/incomes/stats";

/// The route for listing and creating savings goals.
pub const SAVINGS_GOALS: &str = "/api/savings_goals";
/// The route for updating and deleting a savings goal.
pub const SAVINGS_GOAL: &str = "/api/savings_goals/{goal_id}";
/// The route for setting how much has been saved towards a goal.
pub const SAVINGS_GOAL_SAVED: &str = "/api/savings_goals/{goal_id}/saved";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// Parameters are written in braces, e.g. "/api/budgets/{budget_id}".
/// If the path has no parameter it is returned unchanged.
///
/// ```ignore
/// assert_eq!(format_endpoint("/api/budgets/{budget_id}", 1), "/api/budgets/1");
/// ```
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
