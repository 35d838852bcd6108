//! Endpoint for listing budgets with their spending.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetWithSpending, list_budgets, measure_budgets},
    date_range::DateRangeQuery,
    extract::{Json, Query},
    timezone::get_local_date,
    transaction::sum_expenses,
};

/// The state needed for listing budgets.
#[derive(Debug, Clone)]
pub struct ListBudgetsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ListBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// List all of the logged in user's budgets, newest first, with their spending.
///
/// With a `startDate`/`endDate` window, only budgets overlapping the window are
/// listed and each budget is measured against its share of the window.
pub async fn list_budgets_endpoint(
    State(state): State<ListBudgetsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<BudgetWithSpending>>, Error> {
    let query = query.into_date_range()?;
    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = list_budgets(user_id, query, &connection)?;

    measure_budgets(budgets, query, today, |budget, window| {
        sum_expenses(user_id, budget.category_id, window, &connection)
    })
    .map(Json)
}
