//! Database operations for budget alerts.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget_alert::{AlertId, BudgetAlert, NewAlert},
};

/// The most alerts returned by [list_alerts].
pub const ALERT_LIST_LIMIT: u32 = 50;

const SELECT_ALERT: &str = "SELECT a.id, a.user_id, a.budget_id, b.name, a.alert_type, a.message,
            a.current_spent, a.budget_amount, a.percentage, a.is_read, a.created_at
     FROM budget_alert a
     INNER JOIN budget b ON b.id = a.budget_id";

/// Save `alert` unless the budget already has an unread alert of the same type.
///
/// The check and the insert are one statement, and the partial unique index on
/// unread alerts rejects any duplicate that slips past it, so there is never
/// more than one unread alert per budget and type.
///
/// Returns whether the alert was saved.
pub fn insert_alert_if_none_open(
    user_id: UserID,
    alert: &NewAlert,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "INSERT OR IGNORE INTO budget_alert
            (user_id, budget_id, alert_type, message, current_spent, budget_amount, percentage,
             is_read, created_at)
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8
         WHERE NOT EXISTS (
            SELECT 1 FROM budget_alert
            WHERE budget_id = ?2 AND alert_type = ?3 AND is_read = 0
         )",
        (
            user_id.as_i64(),
            alert.budget_id,
            alert.alert_type,
            &alert.message,
            alert.current_spent,
            alert.budget_amount,
            alert.percentage,
            OffsetDateTime::now_utc(),
        ),
    )?;

    Ok(rows_affected == 1)
}

/// Retrieve one of the user's alerts.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to an alert for the user.
pub fn get_alert(user_id: UserID, id: AlertId, connection: &Connection) -> Result<BudgetAlert, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ALERT} WHERE a.id = ?1 AND a.user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_alert_row)
        .map_err(|error| error.into())
}

/// Retrieve the user's most recent alerts, newest first, read or not.
pub fn list_alerts(user_id: UserID, connection: &Connection) -> Result<Vec<BudgetAlert>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ALERT}
             WHERE a.user_id = ?1
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), ALERT_LIST_LIMIT), map_alert_row)?
        .map(|maybe_alert| maybe_alert.map_err(|error| error.into()))
        .collect()
}

/// Mark one of the user's alerts as read and return it.
///
/// Marking an alert that is already read succeeds and changes nothing.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `id` does not refer to an alert for the user.
pub fn mark_alert_read(
    user_id: UserID,
    id: AlertId,
    connection: &Connection,
) -> Result<BudgetAlert, Error> {
    let rows_affected = connection.execute(
        "UPDATE budget_alert SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_alert(user_id, id, connection)
}

/// Create the budget alert table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_alert_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget_alert (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            budget_id INTEGER NOT NULL,
            alert_type TEXT NOT NULL CHECK (alert_type IN (
                'budget_exceeded', 'budget_limit_reached', 'budget_almost_exceeded', 'threshold_reached'
            )),
            message TEXT NOT NULL,
            current_spent REAL NOT NULL,
            budget_amount REAL NOT NULL,
            percentage REAL NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_budget_alert_one_unread
            ON budget_alert(budget_id, alert_type) WHERE is_read = 0;
        CREATE INDEX IF NOT EXISTS idx_budget_alert_user_created
            ON budget_alert(user_id, created_at);",
    )?;

    Ok(())
}

fn map_alert_row(row: &Row) -> Result<BudgetAlert, rusqlite::Error> {
    let raw_user_id = row.get(1)?;

    Ok(BudgetAlert {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        budget_id: row.get(2)?,
        budget_name: row.get(3)?,
        alert_type: row.get(4)?,
        message: row.get(5)?,
        current_spent: row.get(6)?,
        budget_amount: row.get(7)?,
        percentage: row.get(8)?,
        is_read: row.get(9)?,
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
mod budget_alert_query_tests {
    use crate::{
        Error,
        budget::delete_budget,
        budget_alert::{AlertType, NewAlert},
        test_utils::{create_test_budget, create_test_user, get_test_connection},
    };

    use super::{
        ALERT_LIST_LIMIT, get_alert, insert_alert_if_none_open, list_alerts, mark_alert_read,
    };

    fn new_alert(budget_id: i64, alert_type: AlertType) -> NewAlert {
        NewAlert {
            budget_id,
            alert_type,
            message: "Budget \"Food\" has been exceeded! Spent 120 out of 100".to_owned(),
            current_spent: 120.0,
            budget_amount: 100.0,
            percentage: 120.0,
        }
    }

    #[test]
    fn second_open_alert_of_same_type_is_ignored() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        let alert = new_alert(budget.id, AlertType::BudgetExceeded);

        assert_eq!(insert_alert_if_none_open(user_id, &alert, &connection), Ok(true));
        assert_eq!(insert_alert_if_none_open(user_id, &alert, &connection), Ok(false));
        assert_eq!(list_alerts(user_id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn open_alerts_of_different_types_coexist() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);

        for alert_type in [AlertType::BudgetAlmostExceeded, AlertType::BudgetExceeded] {
            let inserted =
                insert_alert_if_none_open(user_id, &new_alert(budget.id, alert_type), &connection);
            assert_eq!(inserted, Ok(true));
        }
    }

    #[test]
    fn read_alert_does_not_block_new_alert() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        let alert = new_alert(budget.id, AlertType::BudgetExceeded);
        insert_alert_if_none_open(user_id, &alert, &connection).unwrap();
        let first = list_alerts(user_id, &connection).unwrap().remove(0);

        let marked = mark_alert_read(user_id, first.id, &connection).unwrap();
        let inserted = insert_alert_if_none_open(user_id, &alert, &connection);

        assert!(marked.is_read);
        assert_eq!(inserted, Ok(true));
        let alerts = list_alerts(user_id, &connection).unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(!alerts[0].is_read);
        assert!(alerts[1].is_read);
    }

    #[test]
    fn duplicate_unread_alert_is_rejected_by_index() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        insert_alert_if_none_open(
            user_id,
            &new_alert(budget.id, AlertType::BudgetExceeded),
            &connection,
        )
        .unwrap();

        let result = connection.execute(
            "INSERT INTO budget_alert (user_id, budget_id, alert_type, message, current_spent,
                                       budget_amount, percentage, is_read, created_at)
             VALUES (?1, ?2, 'budget_exceeded', 'duplicate', 1, 1, 1, 0, '2024-01-01')",
            (user_id.as_i64(), budget.id),
        );

        assert!(result.is_err());
    }

    #[test]
    fn mark_other_users_alert_is_not_found() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let grace = create_test_user(&connection, "grace");
        let budget = create_test_budget(&connection, ada, 100.0);
        insert_alert_if_none_open(ada, &new_alert(budget.id, AlertType::BudgetExceeded), &connection)
            .unwrap();
        let alert = list_alerts(ada, &connection).unwrap().remove(0);

        assert_eq!(
            mark_alert_read(grace, alert.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(get_alert(grace, alert.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn deleting_budget_deletes_its_alerts() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        insert_alert_if_none_open(
            user_id,
            &new_alert(budget.id, AlertType::BudgetExceeded),
            &connection,
        )
        .unwrap();

        delete_budget(user_id, budget.id, &connection).unwrap();

        assert!(list_alerts(user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn list_alerts_is_limited() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        let alert = new_alert(budget.id, AlertType::BudgetExceeded);
        for _ in 0..ALERT_LIST_LIMIT + 5 {
            insert_alert_if_none_open(user_id, &alert, &connection).unwrap();
            connection
                .execute("UPDATE budget_alert SET is_read = 1", ())
                .unwrap();
        }

        let alerts = list_alerts(user_id, &connection).unwrap();

        assert_eq!(alerts.len(), ALERT_LIST_LIMIT as usize);
    }
}
