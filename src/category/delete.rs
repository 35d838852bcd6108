//! Category deletion endpoints.

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
    category::{CategoryId, delete_category},
    extract::Path,
    transaction::TransactionKind,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete one of the logged in user's categories of the route's kind.
///
/// Categories still used by an expense, income or budget cannot be deleted.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(user_id, kind, category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};

    use crate::{
        Error,
        category::{CategoryName, NewCategory, create_category},
        extract::Path,
        test_utils::{create_test_user, get_test_connection},
        transaction::TransactionKind,
    };

    use super::{DeleteCategoryEndpointState, delete_category_endpoint};

    #[tokio::test]
    async fn delete_category_endpoint_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let category = create_category(
            user_id,
            NewCategory::with_defaults(
                TransactionKind::Expense,
                CategoryName::new_unchecked("Rent"),
            ),
            &connection,
        )
        .unwrap();
        let state = DeleteCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let status = delete_category_endpoint(
            State(state),
            Extension(user_id),
            Extension(TransactionKind::Expense),
            Path(category.id),
        )
        .await;

        assert_eq!(status, Ok(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn delete_expense_category_as_income_is_not_found() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let category = create_category(
            user_id,
            NewCategory::with_defaults(
                TransactionKind::Expense,
                CategoryName::new_unchecked("Rent"),
            ),
            &connection,
        )
        .unwrap();
        let state = DeleteCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = delete_category_endpoint(
            State(state),
            Extension(user_id),
            Extension(TransactionKind::Income),
            Path(category.id),
        )
        .await;

        assert_eq!(result, Err(Error::NotFound));
    }
}
