//! Endpoint for listing expenses and incomes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    category::CategoryId,
    date_range::DateRangeQuery,
    extract::{Json, Query},
    transaction::{Transaction, TransactionFilter, TransactionKind, list_transactions},
};

/// The state needed for listing expenses or incomes.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for filtering the transaction list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    /// The first day of the window, "YYYY-MM-DD".
    pub start_date: Option<String>,
    /// The last day of the window, "YYYY-MM-DD".
    pub end_date: Option<String>,
    /// Only list transactions in this category.
    pub category_id: Option<CategoryId>,
}

/// List the logged in user's expenses or incomes, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let date_range = DateRangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
    }
    .into_date_range()?;
    let filter = TransactionFilter {
        date_range,
        category_id: query.category_id,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_transactions(user_id, kind, &filter, &connection).map(Json)
}
