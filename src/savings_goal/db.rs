//! Database operations for savings goals.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    savings_goal::{GoalId, NewSavingsGoal, SavingsGoal},
};

/// Save a new goal for `user_id`.
pub fn create_savings_goal(
    user_id: UserID,
    goal: NewSavingsGoal,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(
            "INSERT INTO savings_goal
                (user_id, name, target_amount, deadline, priority, description, saved_amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, name, target_amount, deadline, priority, description,
                       saved_amount, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &goal.name,
                goal.target_amount,
                goal.deadline,
                goal.priority,
                &goal.description,
                goal.saved_amount,
                OffsetDateTime::now_utc(),
            ),
            map_goal_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve one of the user's goals.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to a goal owned by the user.
pub fn get_savings_goal(
    user_id: UserID,
    id: GoalId,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, deadline, priority, description,
                    saved_amount, created_at
             FROM savings_goal WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_goal_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the user's goals, newest first.
pub fn list_savings_goals(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, deadline, priority, description,
                    saved_amount, created_at
             FROM savings_goal WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map((user_id.as_i64(),), map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Overwrite one of the user's goals with `goal`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to a goal owned by the user.
pub fn update_savings_goal(
    user_id: UserID,
    id: GoalId,
    goal: NewSavingsGoal,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(
            "UPDATE savings_goal
             SET name = ?1, target_amount = ?2, deadline = ?3, priority = ?4, description = ?5,
                 saved_amount = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING id, user_id, name, target_amount, deadline, priority, description,
                       saved_amount, created_at",
        )?
        .query_row(
            (
                &goal.name,
                goal.target_amount,
                goal.deadline,
                goal.priority,
                &goal.description,
                goal.saved_amount,
                id,
                user_id.as_i64(),
            ),
            map_goal_row,
        )
        .map_err(|error| error.into())
}

/// Set how much has been saved towards one of the user's goals.
///
/// The caller must check that `saved_amount` is not negative.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to a goal owned by the user.
pub fn set_saved_amount(
    user_id: UserID,
    id: GoalId,
    saved_amount: f64,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let rows_affected = connection.execute(
        "UPDATE savings_goal SET saved_amount = ?1 WHERE id = ?2 AND user_id = ?3",
        (saved_amount, id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_savings_goal(user_id, id, connection)
}

/// Delete one of the user's goals.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to a goal owned by the user.
pub fn delete_savings_goal(
    user_id: UserID,
    id: GoalId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM savings_goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the savings goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_savings_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS savings_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL CHECK (target_amount > 0),
            deadline TEXT NOT NULL,
            priority TEXT NOT NULL CHECK (priority IN ('low', 'medium', 'high')),
            description TEXT,
            saved_amount REAL NOT NULL DEFAULT 0 CHECK (saved_amount >= 0),
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    let raw_user_id = row.get(1)?;

    Ok(SavingsGoal {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        name: row.get(2)?,
        target_amount: row.get(3)?,
        deadline: row.get(4)?,
        priority: row.get(5)?,
        description: row.get(6)?,
        saved_amount: row.get(7)?,
        created_at: row.get(8)?,
    })
}
