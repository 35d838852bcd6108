//! Expenses and incomes.
//!
//! Both kinds of transaction share one table and one set of handlers. The
//! router tells each handler which kind it serves through a
//! [TransactionKind] request extension.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod get;
mod list;
mod stats;

pub use create::create_transaction_endpoint;
pub use db::{
    TransactionFilter, create_transaction, create_transaction_table, delete_transaction,
    get_transaction, get_transaction_stats, list_transactions, sum_expenses, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{
    CategoryTotal, NewTransaction, Transaction, TransactionForm, TransactionId, TransactionKind,
    TransactionStats, TransactionUpdate,
};
pub use edit::edit_transaction_endpoint;
pub use get::get_transaction_endpoint;
pub use list::list_transactions_endpoint;
pub use stats::transaction_stats_endpoint;
