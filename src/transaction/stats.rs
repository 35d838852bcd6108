//! Endpoint for expense and income summary statistics.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    date_range::DateRangeQuery,
    extract::{Json, Query},
    transaction::{TransactionKind, TransactionStats, get_transaction_stats},
};

/// The state needed for summarising expenses or incomes.
#[derive(Debug, Clone)]
pub struct TransactionStatsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionStatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Per category and overall totals, optionally limited to a date window.
pub async fn transaction_stats_endpoint(
    State(state): State<TransactionStatsState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<TransactionStats>, Error> {
    let date_range = query.into_date_range()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction_stats(user_id, kind, date_range, &connection).map(Json)
}
