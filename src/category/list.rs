//! Category listing endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, list_categories},
    extract::Json,
    transaction::TransactionKind,
};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the logged in user's categories of the route's kind alphabetically.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesEndpointState>,
    Extension(user_id): Extension<UserID>,
    Extension(kind): Extension<TransactionKind>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_categories(user_id, kind, &connection).map(Json)
}
