//! Endpoint for updating an expense or income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::resolve_category,
    extract::{Json, Path},
    transaction::{
        NewTransaction, Transaction, TransactionId, TransactionKind, TransactionUpdate,
        domain::{normalize_note, validate_amount},
        get_transaction, update_transaction,
    },
};

/// The state needed for updating an expense or income.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Update any subset of an expense's or income's fields.
///
/// A new category is resolved the same way as on creation.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Path(transaction_id): Path<TransactionId>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, Error> {
    let amount = update.amount.map(validate_amount).transpose()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let existing = get_transaction(user_id, kind, transaction_id, &connection)?;

    let category_id = match &update.category {
        Some(category_ref) => resolve_category(user_id, kind, category_ref, &connection)?.id,
        None => existing.category_id,
    };

    let note = match update.note {
        Some(note) => normalize_note(Some(note)),
        None => existing.note,
    };

    let transaction = update_transaction(
        user_id,
        transaction_id,
        NewTransaction {
            kind,
            date: update.date.unwrap_or(existing.date),
            category_id,
            amount: amount.unwrap_or(existing.amount),
            note,
        },
        &connection,
    )?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod edit_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, CategoryRef, NewCategory, create_category},
        extract::{Json, Path},
        test_utils::{create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionKind, TransactionUpdate, create_transaction},
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
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
                note: Some("lunch".to_owned()),
            },
            &connection,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let Json(updated) = edit_transaction_endpoint(
            State(state),
            Extension(user_id),
            Extension(TransactionKind::Expense),
            Path(transaction.id),
            Json(TransactionUpdate {
                amount: Some(12.0),
                category: Some(CategoryRef::Name("Eating out".to_owned())),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.amount, 12.0);
        assert_eq!(updated.category_name, "Eating out");
        assert_eq!(updated.date, transaction.date);
        assert_eq!(updated.note, transaction.note);
    }

    #[tokio::test]
    async fn update_missing_transaction_is_not_found() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = edit_transaction_endpoint(
            State(state),
            Extension(user_id),
            Extension(TransactionKind::Expense),
            Path(42),
            Json(TransactionUpdate::default()),
        )
        .await;

        assert_eq!(result.map(|_| ()), Err(Error::NotFound));
    }
}
