//! Database operations for budgets.

use rusqlite::{Connection, Row, named_params};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, NewBudget},
    category::{CategoryId, get_category},
    date_range::DateRange,
    transaction::TransactionKind,
};

const SELECT_BUDGET: &str = "SELECT b.id, b.user_id, b.name, b.amount, b.period, b.category_id, c.name,
            b.start_date, b.end_date, b.is_active, b.notifications, b.alert_threshold, b.created_at
     FROM budget b
     INNER JOIN category c ON c.id = b.category_id";

/// Save a new budget for `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Validation] if the category is not one of the user's expense categories,
/// - [Error::Conflict] if the budget is active and another active budget for the same category overlaps its dates,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    check_budget_category(user_id, budget.category_id, connection)?;

    if budget.is_active {
        check_no_overlapping_budget(user_id, budget.category_id, budget.window, None, connection)?;
    }

    connection.execute(
        "INSERT INTO budget (user_id, name, amount, period, category_id, start_date, end_date,
                             is_active, notifications, alert_threshold, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        (
            user_id.as_i64(),
            &budget.name,
            budget.amount,
            budget.period,
            budget.category_id,
            budget.window.start(),
            budget.window.end(),
            budget.is_active,
            budget.notifications,
            budget.alert_threshold,
            OffsetDateTime::now_utc(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    get_budget(user_id, id, connection)
}

/// Retrieve one of the user's budgets.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to a budget owned by the user.
pub fn get_budget(user_id: UserID, id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE b.id = :id AND b.user_id = :user_id"
        ))?
        .query_row(
            named_params! { ":id": id, ":user_id": user_id.as_i64() },
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's budgets, newest first.
///
/// If `window` is given, only budgets whose dates overlap it are returned.
pub fn list_budgets(
    user_id: UserID,
    window: Option<DateRange>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    query_budgets(user_id, window, false, false, connection)
}

/// Retrieve the user's active budgets, newest first.
///
/// If `window` is given, only budgets whose dates overlap it are returned.
pub fn list_active_budgets(
    user_id: UserID,
    window: Option<DateRange>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    query_budgets(user_id, window, true, false, connection)
}

/// Retrieve the user's budgets that are active and have notifications turned on.
pub fn list_notifying_budgets(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    query_budgets(user_id, None, true, true, connection)
}

fn query_budgets(
    user_id: UserID,
    window: Option<DateRange>,
    active_only: bool,
    notifying_only: bool,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    let start_date = window.map(|window| window.start());
    let end_date = window.map(|window| window.end());

    connection
        .prepare(&format!(
            "{SELECT_BUDGET}
             WHERE b.user_id = :user_id
               AND (:end_date IS NULL OR b.start_date <= :end_date)
               AND (:start_date IS NULL OR b.end_date >= :start_date)
               AND (:active_only = 0 OR b.is_active = 1)
               AND (:notifying_only = 0 OR b.notifications = 1)
             ORDER BY b.created_at DESC, b.id DESC"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":start_date": start_date,
                ":end_date": end_date,
                ":active_only": active_only,
                ":notifying_only": notifying_only,
            },
            map_budget_row,
        )?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Overwrite one of the user's budgets with `budget`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by the user,
/// - [Error::Validation] if the category is not one of the user's expense categories,
/// - [Error::Conflict] if the updated budget is active and overlaps another active budget for the same category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    user_id: UserID,
    id: BudgetId,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    check_budget_category(user_id, budget.category_id, connection)?;

    if budget.is_active {
        check_no_overlapping_budget(
            user_id,
            budget.category_id,
            budget.window,
            Some(id),
            connection,
        )?;
    }

    let rows_affected = connection.execute(
        "UPDATE budget
         SET name = ?1, amount = ?2, period = ?3, category_id = ?4, start_date = ?5,
             end_date = ?6, is_active = ?7, notifications = ?8, alert_threshold = ?9
         WHERE id = ?10 AND user_id = ?11",
        (
            &budget.name,
            budget.amount,
            budget.period,
            budget.category_id,
            budget.window.start(),
            budget.window.end(),
            budget.is_active,
            budget.notifications,
            budget.alert_threshold,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_budget(user_id, id, connection)
}

/// Delete one of the user's budgets along with its alerts.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to a budget owned by the user.
pub fn delete_budget(user_id: UserID, id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn check_budget_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    match get_category(user_id, TransactionKind::Expense, category_id, connection) {
        Ok(_) => Ok(()),
        Err(Error::NotFound) => Err(Error::Validation("Invalid category".to_owned())),
        Err(error) => Err(error),
    }
}

fn check_no_overlapping_budget(
    user_id: UserID,
    category_id: CategoryId,
    window: DateRange,
    excluding: Option<BudgetId>,
    connection: &Connection,
) -> Result<(), Error> {
    let overlapping: i64 = connection.query_row(
        "SELECT COUNT(id) FROM budget
         WHERE user_id = :user_id AND category_id = :category_id AND is_active = 1
           AND start_date <= :end_date AND end_date >= :start_date
           AND (:excluding IS NULL OR id != :excluding)",
        named_params! {
            ":user_id": user_id.as_i64(),
            ":category_id": category_id,
            ":start_date": window.start(),
            ":end_date": window.end(),
            ":excluding": excluding,
        },
        |row| row.get(0),
    )?;

    if overlapping > 0 {
        return Err(Error::Conflict(
            "Budget already exists for this category in the selected time period".to_owned(),
        ));
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'yearly')),
            category_id INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            notifications INTEGER NOT NULL DEFAULT 1,
            alert_threshold REAL NOT NULL DEFAULT 80 CHECK (alert_threshold BETWEEN 0 AND 100),
            created_at TEXT NOT NULL,
            CHECK (start_date <= end_date),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user_category
            ON budget(user_id, category_id, start_date, end_date);",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_user_id = row.get(1)?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        name: row.get(2)?,
        amount: row.get(3)?,
        period: row.get(4)?,
        category_id: row.get(5)?,
        category_name: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
        is_active: row.get(9)?,
        notifications: row.get(10)?,
        alert_threshold: row.get(11)?,
        created_at: row.get(12)?,
    })
}
