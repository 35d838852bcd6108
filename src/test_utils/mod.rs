#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{create_test_budget, create_test_expense, create_test_user, get_test_connection};
pub(crate) use http::parse_json_body;
