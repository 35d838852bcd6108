use rusqlite::Connection;
use time::{Date, macros::date};

use crate::{
    auth::{PasswordHash, UserID, Username, create_user},
    budget::{Budget, BudgetForm, create_budget},
    category::{CategoryId, CategoryName, NewCategory, create_category},
    db::initialize,
    transaction::{NewTransaction, Transaction, TransactionKind, create_transaction},
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn create_test_user(connection: &Connection, username: &str) -> UserID {
    create_user(
        Username::new_unchecked(username),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
    .id
}

/// A January 2024 budget with an 80% alert threshold in a new "Groceries" expense category.
pub(crate) fn create_test_budget(connection: &Connection, user_id: UserID, amount: f64) -> Budget {
    let category = create_category(
        user_id,
        NewCategory::with_defaults(
            TransactionKind::Expense,
            CategoryName::new_unchecked("Groceries"),
        ),
        connection,
    )
    .expect("Could not create test category");

    let new_budget = BudgetForm {
        name: Some("Food".to_owned()),
        amount: Some(amount),
        category_id: Some(category.id),
        start_date: Some(date!(2024 - 01 - 01)),
        end_date: Some(date!(2024 - 01 - 31)),
        ..Default::default()
    }
    .into_new_budget()
    .expect("Could not validate test budget");

    create_budget(user_id, new_budget, connection).expect("Could not create test budget")
}

pub(crate) fn create_test_expense(
    connection: &Connection,
    user_id: UserID,
    category_id: CategoryId,
    date: Date,
    amount: f64,
) -> Transaction {
    create_transaction(
        user_id,
        NewTransaction {
            kind: TransactionKind::Expense,
            date,
            category_id,
            amount,
            note: None,
        },
        connection,
    )
    .expect("Could not create test expense")
}
