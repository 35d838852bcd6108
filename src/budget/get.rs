//! Endpoint for fetching a single budget with its spending.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetId, BudgetWithSpending, DateStatus, calculate_spending, get_budget},
    extract::{Json, Path},
    timezone::get_local_date,
    transaction::sum_expenses,
};

/// The state needed for fetching a budget.
#[derive(Debug, Clone)]
pub struct GetBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for GetBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Get one of the logged in user's budgets with its spending over the budget's own dates.
pub async fn get_budget_endpoint(
    State(state): State<GetBudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<BudgetWithSpending>, Error> {
    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(user_id, budget_id, &connection)?;
    let current_spent = sum_expenses(user_id, budget.category_id, budget.window(), &connection)?;

    // Without a query window the spending window is the budget's own dates,
    // so there is always a result.
    let spending = calculate_spending(&budget, None, current_spent).ok_or(Error::NotFound)?;
    let date_status = DateStatus::of(budget.window(), today);

    Ok(Json(BudgetWithSpending {
        budget,
        spending,
        date_status,
    }))
}
