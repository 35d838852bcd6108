//! Expense and income categories.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, get_category, list_categories,
    resolve_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryForm, CategoryId, CategoryName, CategoryRef, NewCategory};
pub use list::list_categories_endpoint;
