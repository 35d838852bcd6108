//! Endpoint for fetching a single expense or income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    extract::{Json, Path},
    transaction::{Transaction, TransactionId, TransactionKind, get_transaction},
};

/// The state needed for fetching an expense or income.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get one of the logged in user's expenses or incomes by ID.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction(user_id, kind, transaction_id, &connection).map(Json)
}
