//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::DatabaseId, transaction::TransactionKind};

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// The icon given to categories created without one.
pub const DEFAULT_CATEGORY_ICON: &str = "💰";

/// The colour given to categories created without one.
pub fn default_category_color(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "#9CA3AF",
        TransactionKind::Income => "#10B981",
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::Validation("Category name is required".to_owned()))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user defined label for grouping expenses or incomes, e.g. "Groceries" or "Salary".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user who owns the category.
    #[serde(skip)]
    pub user_id: UserID,
    /// Whether the category is for expenses or incomes.
    pub kind: TransactionKind,
    /// The category's name, unique per user and kind ignoring case.
    pub name: CategoryName,
    /// An emoji or short string shown next to the name.
    pub icon: String,
    /// A CSS colour for charts, e.g. "#9CA3AF".
    pub color: String,
}

/// A validated category that is ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// Whether the category is for expenses or incomes.
    pub kind: TransactionKind,
    /// The category's name.
    pub name: CategoryName,
    /// An emoji or short string shown next to the name.
    pub icon: String,
    /// A CSS colour for charts.
    pub color: String,
}

impl NewCategory {
    /// A category called `name` with the default icon and colour for `kind`.
    pub fn with_defaults(kind: TransactionKind, name: CategoryName) -> Self {
        Self {
            kind,
            name,
            icon: DEFAULT_CATEGORY_ICON.to_owned(),
            color: default_category_color(kind).to_owned(),
        }
    }
}

/// The JSON body for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    /// The category's name.
    pub name: String,
    /// Defaults to [DEFAULT_CATEGORY_ICON].
    pub icon: Option<String>,
    /// Defaults to [default_category_color].
    pub color: Option<String>,
}

impl CategoryForm {
    /// Validate the form and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the name is empty.
    pub fn into_new_category(self, kind: TransactionKind) -> Result<NewCategory, Error> {
        let name = CategoryName::new(&self.name)?;
        let mut category = NewCategory::with_defaults(kind, name);

        if let Some(icon) = non_blank(self.icon) {
            category.icon = icon;
        }
        if let Some(color) = non_blank(self.color) {
            category.color = color;
        }

        Ok(category)
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// How a request refers to a category: by ID, or by name.
///
/// In JSON this is either `{"id": 3}` or `{"name": "Groceries"}`.
/// A name that does not match an existing category creates one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryRef {
    /// An existing category owned by the user.
    Id(CategoryId),
    /// A category name, matched ignoring case.
    Name(String),
}
