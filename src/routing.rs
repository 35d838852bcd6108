//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Extension, Router, middleware,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    auth::{auth_guard, post_log_in, post_log_out, register_user},
    budget::{
        budget_stats_endpoint, create_budget_endpoint, delete_budget_endpoint,
        edit_budget_endpoint, get_budget_endpoint, list_budgets_endpoint,
    },
    budget_alert::{
        check_budget_alerts_endpoint, list_budget_alerts_endpoint,
        mark_budget_alert_read_endpoint,
    },
    category::{create_category_endpoint, delete_category_endpoint, list_categories_endpoint},
    endpoints,
    not_found::get_404_not_found,
    savings_goal::{
        create_savings_goal_endpoint, delete_savings_goal_endpoint, edit_savings_goal_endpoint,
        list_savings_goals_endpoint, set_saved_amount_endpoint,
    },
    transaction::{
        TransactionKind, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, get_transaction_endpoint, list_transactions_endpoint,
        transaction_stats_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET_STATS, get(budget_stats_endpoint))
        .route(
            endpoints::CHECK_BUDGET_ALERTS,
            post(check_budget_alerts_endpoint),
        )
        .route(endpoints::BUDGET_ALERTS, get(list_budget_alerts_endpoint))
        .route(
            endpoints::MARK_BUDGET_ALERT_READ,
            put(mark_budget_alert_read_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(edit_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::SAVINGS_GOALS,
            get(list_savings_goals_endpoint).post(create_savings_goal_endpoint),
        )
        .route(
            endpoints::SAVINGS_GOAL,
            put(edit_savings_goal_endpoint).delete(delete_savings_goal_endpoint),
        )
        .route(
            endpoints::SAVINGS_GOAL_SAVED,
            put(set_saved_amount_endpoint),
        )
        .merge(transaction_routes(
            TransactionKind::Expense,
            endpoints::EXPENSE_CATEGORIES,
            endpoints::EXPENSE_CATEGORY,
            endpoints::EXPENSES,
            endpoints::EXPENSE,
            endpoints::EXPENSE_STATS,
        ))
        .merge(transaction_routes(
            TransactionKind::Income,
            endpoints::INCOME_CATEGORIES,
            endpoints::INCOME_CATEGORY,
            endpoints::INCOMES,
            endpoints::INCOME,
            endpoints::INCOME_STATS,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The category and transaction routes for one kind of transaction.
///
/// Expenses and incomes share handlers, the handlers read the kind from the
/// request extensions.
fn transaction_routes(
    kind: TransactionKind,
    categories: &str,
    category: &str,
    transactions: &str,
    transaction: &str,
    stats: &str,
) -> Router<AppState> {
    Router::new()
        .route(
            categories,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(category, delete(delete_category_endpoint))
        .route(
            transactions,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(stats, get(transaction_stats_endpoint))
        .route(
            transaction,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .layer(Extension(kind))
}
