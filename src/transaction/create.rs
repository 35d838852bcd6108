//! Expense and income creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::resolve_category,
    extract::Json,
    transaction::{
        NewTransaction, Transaction, TransactionForm, TransactionKind, create_transaction,
        domain::{normalize_note, validate_amount},
    },
};

/// The state needed for creating an expense or income.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Record an expense or income for the logged in user.
///
/// A category given by name is created if the user does not have one yet.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let date = form
        .date
        .ok_or_else(|| Error::Validation("Date is required".to_owned()))?;
    let amount = form
        .amount
        .ok_or_else(|| Error::Validation("Amount is required".to_owned()))
        .and_then(validate_amount)?;
    let category_ref = form
        .category
        .ok_or_else(|| Error::Validation("Category is required".to_owned()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = resolve_category(user_id, kind, &category_ref, &connection)?;

    let transaction = create_transaction(
        user_id,
        NewTransaction {
            kind,
            date,
            category_id: category.id,
            amount,
            note: normalize_note(form.note),
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
