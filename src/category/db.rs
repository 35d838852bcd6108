//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryName, CategoryRef, NewCategory},
    transaction::TransactionKind,
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::Conflict] if the user already has a category of the
/// same kind with the same name, ignoring case.
pub fn create_category(
    user_id: UserID,
    category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (user_id, kind, name, icon, color)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, kind, name, icon, color",
        )?
        .query_row(
            (
                user_id.as_i64(),
                category.kind,
                category.name.as_ref(),
                &category.icon,
                &category.color,
            ),
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::Conflict(format!("Category \"{}\" already exists", category.name)),
            error => error.into(),
        })
}

/// Retrieve one of the user's categories of the given kind by ID.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the category does not exist, belongs to
/// another user, or is of the other kind.
pub fn get_category(
    user_id: UserID,
    kind: TransactionKind,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, name, icon, color FROM category
             WHERE id = :id AND user_id = :user_id AND kind = :kind",
        )?
        .query_row(
            rusqlite::named_params! {
                ":id": category_id,
                ":user_id": user_id.as_i64(),
                ":kind": kind,
            },
            map_row,
        )
        .map_err(|error| error.into())
}

/// Find the user's category of the given kind called `name`, ignoring case.
pub fn find_category_by_name(
    user_id: UserID,
    kind: TransactionKind,
    name: &CategoryName,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    let result = connection
        .prepare(
            "SELECT id, user_id, kind, name, icon, color FROM category
             WHERE user_id = :user_id AND kind = :kind AND name = :name COLLATE NOCASE",
        )?
        .query_row(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind,
                ":name": name.as_ref(),
            },
            map_row,
        );

    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Retrieve the user's categories of the given kind ordered alphabetically by name.
pub fn list_categories(
    user_id: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, name, icon, color FROM category
             WHERE user_id = :user_id AND kind = :kind
             ORDER BY name COLLATE NOCASE ASC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind,
            },
            map_row,
        )?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's categories.
///
/// # Errors
///
/// Returns a:
/// - [Error::Conflict] if any expense, income or budget still uses the category,
/// - [Error::NotFound] if the category does not exist or belongs to another user.
pub fn delete_category(
    user_id: UserID,
    kind: TransactionKind,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(user_id, kind, category_id, connection)?;

    let reference_count: i64 = connection.query_row(
        "SELECT
            (SELECT COUNT(*) FROM \"transaction\" WHERE category_id = ?1 AND user_id = ?2)
          + (SELECT COUNT(*) FROM budget WHERE category_id = ?1 AND user_id = ?2)",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if reference_count > 0 {
        return Err(Error::Conflict(
            "Category is still used by expenses, incomes or budgets".to_owned(),
        ));
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
        (category_id, user_id.as_i64(), kind),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Turn a category reference from a request into one of the user's categories.
///
/// An ID must refer to a category of `kind` owned by the user. A name is
/// matched ignoring case, and a new category with the default icon and
/// colour is created if there is no match.
///
/// # Errors
///
/// Returns an [Error::Validation] if the ID is not one of the user's
/// categories of `kind`, or if the name is empty.
pub fn resolve_category(
    user_id: UserID,
    kind: TransactionKind,
    category_ref: &CategoryRef,
    connection: &Connection,
) -> Result<Category, Error> {
    match category_ref {
        CategoryRef::Id(category_id) => {
            match get_category(user_id, kind, *category_id, connection) {
                Ok(category) => Ok(category),
                Err(Error::NotFound) => Err(Error::Validation(format!(
                    "Invalid {kind} category {category_id}"
                ))),
                Err(error) => Err(error),
            }
        }
        CategoryRef::Name(raw_name) => {
            let name = CategoryName::new(raw_name)?;

            match find_category_by_name(user_id, kind, &name, connection)? {
                Some(category) => Ok(category),
                None => {
                    tracing::debug!("Creating {kind} category \"{name}\" for user {user_id}");
                    create_category(user_id, NewCategory::with_defaults(kind, name), connection)
                }
            }
        }
    }
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_user_kind_name
            ON category(user_id, kind, name COLLATE NOCASE);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let kind = row.get(2)?;
    let raw_name: String = row.get(3)?;

    Ok(Category {
        id,
        user_id: UserID::new(raw_user_id),
        kind,
        name: CategoryName::new_unchecked(&raw_name),
        icon: row.get(4)?,
        color: row.get(5)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, CategoryRef, NewCategory},
        test_utils::{create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionKind, create_transaction},
    };

    use super::{
        create_category, delete_category, find_category_by_name, get_category, list_categories,
        resolve_category,
    };

    fn new_expense_category(name: &str) -> NewCategory {
        NewCategory::with_defaults(TransactionKind::Expense, CategoryName::new_unchecked(name))
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");

        let category =
            create_category(user_id, new_expense_category("Groceries"), &connection).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.user_id, user_id);
        assert_eq!(category.name.as_ref(), "Groceries");
        assert_eq!(category.color, "#9CA3AF");
    }

    #[test]
    fn create_duplicate_name_ignoring_case_is_conflict() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        create_category(user_id, new_expense_category("Groceries"), &connection).unwrap();

        let result = create_category(user_id, new_expense_category("groceries"), &connection);

        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn same_name_allowed_for_other_kind_and_other_user() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let grace = create_test_user(&connection, "grace");
        create_category(ada, new_expense_category("Gifts"), &connection).unwrap();

        let income = create_category(
            ada,
            NewCategory::with_defaults(TransactionKind::Income, CategoryName::new_unchecked("Gifts")),
            &connection,
        );
        let other_user = create_category(grace, new_expense_category("Gifts"), &connection);

        assert!(income.is_ok());
        assert!(other_user.is_ok());
    }

    #[test]
    fn get_category_of_other_user_is_not_found() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let grace = create_test_user(&connection, "grace");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();

        let result = get_category(grace, TransactionKind::Expense, category.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_category_of_other_kind_is_not_found() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();

        let result = get_category(ada, TransactionKind::Income, category.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn list_categories_is_alphabetical_and_scoped() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let grace = create_test_user(&connection, "grace");
        create_category(ada, new_expense_category("rent"), &connection).unwrap();
        create_category(ada, new_expense_category("Groceries"), &connection).unwrap();
        create_category(grace, new_expense_category("Books"), &connection).unwrap();

        let names: Vec<String> = list_categories(ada, TransactionKind::Expense, &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, ["Groceries", "rent"]);
    }

    #[test]
    fn find_by_name_ignores_case() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();

        let found = find_category_by_name(
            ada,
            TransactionKind::Expense,
            &CategoryName::new_unchecked("RENT"),
            &connection,
        );

        assert_eq!(found, Ok(Some(category)));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();

        delete_category(ada, TransactionKind::Expense, category.id, &connection).unwrap();

        assert_eq!(
            get_category(ada, TransactionKind::Expense, category.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_missing_category_is_not_found() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");

        let result = delete_category(ada, TransactionKind::Expense, 999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_category_in_use_is_conflict() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();
        create_transaction(
            ada,
            NewTransaction {
                kind: TransactionKind::Expense,
                date: date!(2024 - 01 - 01),
                category_id: category.id,
                amount: 1200.0,
                note: None,
            },
            &connection,
        )
        .unwrap();

        let result = delete_category(ada, TransactionKind::Expense, category.id, &connection);

        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn delete_category_in_use_as_other_kind_is_not_found() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();
        create_transaction(
            ada,
            NewTransaction {
                kind: TransactionKind::Expense,
                date: date!(2024 - 01 - 01),
                category_id: category.id,
                amount: 1200.0,
                note: None,
            },
            &connection,
        )
        .unwrap();

        let result = delete_category(ada, TransactionKind::Income, category.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert!(get_category(ada, TransactionKind::Expense, category.id, &connection).is_ok());
    }

    #[test]
    fn resolve_by_id_of_wrong_kind_is_validation_error() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();

        let result = resolve_category(
            ada,
            TransactionKind::Income,
            &CategoryRef::Id(category.id),
            &connection,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn resolve_by_name_reuses_existing_category() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");
        let category = create_category(ada, new_expense_category("Rent"), &connection).unwrap();

        let resolved = resolve_category(
            ada,
            TransactionKind::Expense,
            &CategoryRef::Name(" rent ".to_owned()),
            &connection,
        );

        assert_eq!(resolved, Ok(category));
    }

    #[test]
    fn resolve_by_new_name_creates_category() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");

        let resolved = resolve_category(
            ada,
            TransactionKind::Income,
            &CategoryRef::Name("Salary".to_owned()),
            &connection,
        )
        .unwrap();

        assert_eq!(resolved.icon, "💰");
        assert_eq!(resolved.color, "#10B981");
        assert_eq!(
            list_categories(ada, TransactionKind::Income, &connection).unwrap(),
            vec![resolved]
        );
    }

    #[test]
    fn resolve_by_empty_name_is_validation_error() {
        let connection = get_test_connection();
        let ada = create_test_user(&connection, "ada");

        let result = resolve_category(
            ada,
            TransactionKind::Expense,
            &CategoryRef::Name("   ".to_owned()),
            &connection,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
