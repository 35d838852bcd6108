//! Endpoint for the budget overview: each active budget's spending plus the totals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetStatsReport, build_stats_report, list_active_budgets, measure_budgets},
    date_range::DateRangeQuery,
    extract::{Json, Query},
    timezone::get_local_date,
    transaction::sum_expenses,
};

/// The state needed for the budget stats.
#[derive(Debug, Clone)]
pub struct BudgetStatsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetStatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Spending and totals for the logged in user's active budgets.
pub async fn budget_stats_endpoint(
    State(state): State<BudgetStatsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<BudgetStatsReport>, Error> {
    let query = query.into_date_range()?;
    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = list_active_budgets(user_id, query, &connection)?;
    let measured = measure_budgets(budgets, query, today, |budget, window| {
        sum_expenses(user_id, budget.category_id, window, &connection)
    })?;

    Ok(Json(build_stats_report(measured)))
}
