//! Endpoint for deleting an expense or income.

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
    extract::Path,
    transaction::{TransactionId, TransactionKind, delete_transaction},
};

/// The state needed for deleting an expense or income.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete one of the logged in user's expenses or incomes.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(user_id, kind, transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, NewCategory, create_category},
        extract::Path,
        test_utils::{create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionKind, create_transaction, get_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn delete_expense_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let category = create_category(
            user_id,
            NewCategory::with_defaults(TransactionKind::Expense, CategoryName::new_unchecked("Food")),
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            user_id,
            NewTransaction {
                kind: TransactionKind::Expense,
                date: date!(2024 - 01 - 01),
                category_id: category.id,
                amount: 10.0,
                note: None,
            },
            &connection,
        )
        .unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let status = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Extension(TransactionKind::Expense),
            Path(transaction.id),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(user_id, TransactionKind::Expense, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_expense_through_income_route_is_not_found() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let category = create_category(
            user_id,
            NewCategory::with_defaults(TransactionKind::Expense, CategoryName::new_unchecked("Food")),
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            user_id,
            NewTransaction {
                kind: TransactionKind::Expense,
                date: date!(2024 - 01 - 01),
                category_id: category.id,
                amount: 10.0,
                note: None,
            },
            &connection,
        )
        .unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = delete_transaction_endpoint(
            State(state),
            Extension(user_id),
            Extension(TransactionKind::Income),
            Path(transaction.id),
        )
        .await;

        assert_eq!(result, Err(Error::NotFound));
    }
}
