//! Database operations for expenses and incomes.

use rusqlite::{Connection, Row, named_params};

use crate::{
    Error,
    auth::UserID,
    category::CategoryId,
    date_range::DateRange,
    transaction::{
        CategoryTotal, NewTransaction, Transaction, TransactionId, TransactionKind,
        TransactionStats,
    },
};

const SELECT_TRANSACTION: &str = "SELECT t.id, t.user_id, t.kind, t.date, t.category_id, c.name, t.amount, t.note
     FROM \"transaction\" t
     INNER JOIN category c ON c.id = t.category_id";

/// Optional filters for listing transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions dated within this range.
    pub date_range: Option<DateRange>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
}

/// Create a new expense or income for `user_id`.
///
/// The caller must check that the category belongs to the user and is of
/// the same kind, e.g. with [crate::category::resolve_category].
///
/// # Errors
/// This function will return a [Error::SqlError] if the category does not exist or there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (user_id, kind, date, category_id, amount, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            transaction.kind,
            transaction.date,
            transaction.category_id,
            transaction.amount,
            &transaction.note,
        ),
    )?;

    let id = connection.last_insert_rowid();

    get_transaction(user_id, transaction.kind, id, connection)
}

/// Retrieve one of the user's transactions of the given kind by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of `kind` owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    kind: TransactionKind,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id AND t.kind = :kind"
        ))?
        .query_row(
            named_params! {
                ":id": id,
                ":user_id": user_id.as_i64(),
                ":kind": kind,
            },
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the user's transactions of the given kind, most recent date first.
pub fn list_transactions(
    user_id: UserID,
    kind: TransactionKind,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let start_date = filter.date_range.map(|range| range.start());
    let end_date = filter.date_range.map(|range| range.end());

    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION}
             WHERE t.user_id = :user_id AND t.kind = :kind
               AND (:start_date IS NULL OR t.date >= :start_date)
               AND (:end_date IS NULL OR t.date <= :end_date)
               AND (:category_id IS NULL OR t.category_id = :category_id)
             ORDER BY t.date DESC, t.id DESC"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind,
                ":start_date": start_date,
                ":end_date": end_date,
                ":category_id": filter.category_id,
            },
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite one of the user's transactions with `transaction`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of the same kind owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET date = ?1, category_id = ?2, amount = ?3, note = ?4
         WHERE id = ?5 AND user_id = ?6 AND kind = ?7",
        (
            transaction.date,
            transaction.category_id,
            transaction.amount,
            &transaction.note,
            id,
            user_id.as_i64(),
            transaction.kind,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_transaction(user_id, transaction.kind, id, connection)
}

/// Delete one of the user's transactions.
///
/// # Errors
/// Returns an [Error::NotFound] if `id` does not refer to a transaction of `kind` owned by the user.
pub fn delete_transaction(
    user_id: UserID,
    kind: TransactionKind,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
        (id, user_id.as_i64(), kind),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The total amount the user spent in a category over `date_range`, inclusive.
///
/// Returns zero if there are no matching expenses.
pub fn sum_expenses(
    user_id: UserID,
    category_id: CategoryId,
    date_range: DateRange,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\"
             WHERE user_id = :user_id AND kind = :kind AND category_id = :category_id
               AND date BETWEEN :start_date AND :end_date",
        )?
        .query_row(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": TransactionKind::Expense,
                ":category_id": category_id,
                ":start_date": date_range.start(),
                ":end_date": date_range.end(),
            },
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Totals per category and overall for the user's transactions of `kind`.
///
/// Categories are ordered by total, largest first.
pub fn get_transaction_stats(
    user_id: UserID,
    kind: TransactionKind,
    date_range: Option<DateRange>,
    connection: &Connection,
) -> Result<TransactionStats, Error> {
    let start_date = date_range.map(|range| range.start());
    let end_date = date_range.map(|range| range.end());

    let categories = connection
        .prepare(
            "SELECT t.category_id, c.name, SUM(t.amount), COUNT(t.id)
             FROM \"transaction\" t
             INNER JOIN category c ON c.id = t.category_id
             WHERE t.user_id = :user_id AND t.kind = :kind
               AND (:start_date IS NULL OR t.date >= :start_date)
               AND (:end_date IS NULL OR t.date <= :end_date)
             GROUP BY t.category_id, c.name
             ORDER BY SUM(t.amount) DESC, c.name ASC",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind,
                ":start_date": start_date,
                ":end_date": end_date,
            },
            |row| {
                Ok(CategoryTotal {
                    category_id: row.get(0)?,
                    category_name: row.get(1)?,
                    total: row.get(2)?,
                    count: row.get(3)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total: f64 = categories.iter().map(|category| category.total).sum();
    let count: i64 = categories.iter().map(|category| category.count).sum();
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    Ok(TransactionStats {
        categories,
        total,
        count,
        average,
    })
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
            date TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            note TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_kind_date
            ON \"transaction\"(user_id, kind, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_date
            ON \"transaction\"(category_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// Expects the columns of [SELECT_TRANSACTION] in order.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_user_id = row.get(1)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        kind: row.get(2)?,
        date: row.get(3)?,
        category_id: row.get(4)?,
        category_name: row.get(5)?,
        amount: row.get(6)?,
        note: row.get(7)?,
    })
}
