//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, budget::create_budget_table,
    budget_alert::create_budget_alert_table, category::create_category_table,
    savings_goal::create_savings_goal_table, transaction::create_transaction_table,
};

/// Create all the tables and indexes for the application's domain models.
///
/// Foreign key enforcement is switched on for `connection` first, so that
/// deleting a budget also deletes its alerts.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any table cannot be created. No tables are
/// created in that case.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_budget_alert_table(&transaction)?;
    create_savings_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
