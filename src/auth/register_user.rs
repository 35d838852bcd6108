//! The registration endpoint. Creates a user and logs them in.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, Username, ValidatedPassword, create_user, set_auth_cookie},
    extract::Json,
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt work factor for hashing the new password.
    pub hash_cost: u32,
    /// The database connection for saving the new user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            hash_cost: PasswordHash::DEFAULT_COST,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The details submitted to create an account.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    /// The name to log in with.
    pub username: String,
    /// The raw password.
    pub password: String,
    /// Must match `password`.
    pub confirm_password: String,
}

/// Create a new user and log them in.
///
/// Responds with 201 and the new user's ID and username.
///
/// # Errors
///
/// Returns a:
/// - [Error::Validation] if the username is empty or the passwords do not match,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::Conflict] if the username is taken.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(form): Json<RegisterForm>,
) -> Result<Response, Error> {
    let username = Username::new(&form.username)?;

    if form.password != form.confirm_password {
        return Err(Error::Validation("Passwords do not match".to_owned()));
    }

    let password = ValidatedPassword::new(&form.password, &[username.as_ref()])?;
    let password_hash = PasswordHash::new(password, state.hash_cost)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(username, password_hash, &connection)?
    };

    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({ "id": user.id, "username": user.username })),
    )
        .into_response())
}
