//! Endpoints for checking, listing and acknowledging budget alerts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget_alert::{AlertId, BudgetAlert, check_budget_alerts, list_alerts, mark_alert_read},
    extract::{Json, Path},
};

/// The state needed for the budget alert endpoints.
#[derive(Debug, Clone)]
pub struct BudgetAlertState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetAlertState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response for an alert check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCheckResult {
    /// How many alerts the check raised.
    pub new_alerts: usize,
}

/// Raise any alerts that are due for the logged in user's budgets.
pub async fn check_budget_alerts_endpoint(
    State(state): State<BudgetAlertState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<AlertCheckResult>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let new_alerts = check_budget_alerts(user_id, &connection)?;

    Ok(Json(AlertCheckResult { new_alerts }))
}

/// List the logged in user's most recent alerts.
pub async fn list_budget_alerts_endpoint(
    State(state): State<BudgetAlertState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<BudgetAlert>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_alerts(user_id, &connection).map(Json)
}

/// Mark one of the logged in user's alerts as read.
pub async fn mark_budget_alert_read_endpoint(
    State(state): State<BudgetAlertState>,
    Extension(user_id): Extension<UserID>,
    Path(alert_id): Path<AlertId>,
) -> Result<Json<BudgetAlert>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    mark_alert_read(user_id, alert_id, &connection).map(Json)
}
