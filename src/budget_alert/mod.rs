//! Alerts raised when a budget is almost exceeded, at its limit or exceeded.
//!
//! Alerts are polled: the client asks for a check, which raises any alerts
//! that are due, and then lists them.

mod db;
mod domain;
mod endpoints;
mod engine;

pub use db::{create_budget_alert_table, insert_alert_if_none_open, list_alerts, mark_alert_read};
pub use domain::{AlertId, AlertType, BudgetAlert, NewAlert};
pub use endpoints::{
    check_budget_alerts_endpoint, list_budget_alerts_endpoint, mark_budget_alert_read_endpoint,
};
pub use engine::check_budget_alerts;
