//! Savings goal endpoints.

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
    extract::{Json, Path},
    savings_goal::{
        GoalId, SavedAmountForm, SavingsGoal, SavingsGoalForm, create_savings_goal,
        delete_savings_goal, domain::validate_saved_amount, get_savings_goal,
        list_savings_goals, set_saved_amount, update_savings_goal,
    },
};

/// The state needed for the savings goal endpoints.
#[derive(Debug, Clone)]
pub struct SavingsGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SavingsGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the logged in user's savings goals, newest first.
pub async fn list_savings_goals_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<SavingsGoal>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_savings_goals(user_id, &connection).map(Json)
}

/// Create a savings goal for the logged in user.
pub async fn create_savings_goal_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<SavingsGoalForm>,
) -> Result<(StatusCode, Json<SavingsGoal>), Error> {
    let new_goal = form.into_new_goal()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = create_savings_goal(user_id, new_goal, &connection)?;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// Update any subset of a savings goal's fields.
pub async fn edit_savings_goal_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Json(form): Json<SavingsGoalForm>,
) -> Result<Json<SavingsGoal>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let existing = get_savings_goal(user_id, goal_id, &connection)?;
    let updated = form.apply_to(&existing)?;

    update_savings_goal(user_id, goal_id, updated, &connection).map(Json)
}

/// Set how much the user has saved towards a goal.
pub async fn set_saved_amount_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    Json(form): Json<SavedAmountForm>,
) -> Result<Json<SavingsGoal>, Error> {
    let saved_amount = validate_saved_amount(form.saved_amount)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    set_saved_amount(user_id, goal_id, saved_amount, &connection).map(Json)
}

/// Delete one of the logged in user's savings goals.
pub async fn delete_savings_goal_endpoint(
    State(state): State<SavingsGoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_savings_goal(user_id, goal_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
