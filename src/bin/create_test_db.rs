use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budget_tracker::{
    BudgetForm, CategoryName, NewCategory, NewTransaction, PasswordHash, TransactionKind,
    Username, ValidatedPassword, create_budget, create_category, create_transaction, create_user,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of budget_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database has one user "test" with the password "test", a couple of
/// expense categories, a month of expenses and a budget that is nearly spent.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("test")?, password_hash, &conn)?;

    println!("Creating categories...");

    let groceries = create_category(
        user.id,
        NewCategory::with_defaults(TransactionKind::Expense, CategoryName::new("Groceries")?),
        &conn,
    )?;
    let transport = create_category(
        user.id,
        NewCategory::with_defaults(TransactionKind::Expense, CategoryName::new("Transport")?),
        &conn,
    )?;
    let salary = create_category(
        user.id,
        NewCategory::with_defaults(TransactionKind::Income, CategoryName::new("Salary")?),
        &conn,
    )?;

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let month_start = today.replace_day(1)?;

    for day in 0..today.day() as i64 {
        let date = month_start + Duration::days(day);
        let (category_id, amount) = if day % 3 == 0 {
            (transport.id, 12.5)
        } else {
            (groceries.id, 18.0)
        };

        create_transaction(
            user.id,
            NewTransaction {
                kind: TransactionKind::Expense,
                date,
                category_id,
                amount,
                note: None,
            },
            &conn,
        )?;
    }

    create_transaction(
        user.id,
        NewTransaction {
            kind: TransactionKind::Income,
            date: month_start,
            category_id: salary.id,
            amount: 4000.0,
            note: Some("Monthly pay".to_owned()),
        },
        &conn,
    )?;

    println!("Creating budget...");

    let new_budget = BudgetForm {
        name: Some("Monthly groceries".to_owned()),
        amount: Some(400.0),
        category_id: Some(groceries.id),
        start_date: Some(month_start),
        end_date: Some(month_start + Duration::days(27)),
        ..Default::default()
    }
    .into_new_budget()?;
    create_budget(user.id, new_budget, &conn)?;

    println!("Success!");

    Ok(())
}
