use std::{error::Error, path::Path, process::exit, str::FromStr};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use spendlog::{
    Amount, NewExpense, PasswordHash, Period, Username, ValidatedPassword, create_expense,
    create_user, get_or_create_budget, initialize_db, set_budget_amount,
};

/// A utility for creating a test database for the spendlog web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The expenses added for the test user as (days ago, amount, category, description).
const SAMPLE_EXPENSES: [(i64, &str, &str, &str); 6] = [
    (0, "12.50", "Food", "Lunch"),
    (1, "64.20", "Groceries", "Weekly shop"),
    (3, "4.80", "Coffee", "Flat white"),
    (6, "120.00", "Utilities", "Power bill"),
    (10, "35.99", "Entertainment", "Concert tickets"),
    (40, "89.95", "Clothing", "Rain jacket"),
];

/// Create and populate a database for manual testing.
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

    println!("Creating test user \"demo\" with the password \"test\"...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("demo")?, password_hash, &conn)?;

    let today = OffsetDateTime::now_utc().date();

    println!("Adding sample expenses...");

    for (days_ago, amount, category, description) in SAMPLE_EXPENSES {
        let date: Date = today - Duration::days(days_ago);

        create_expense(
            NewExpense {
                amount: Amount::from_str(amount)?,
                category: category.to_owned(),
                description: description.to_owned(),
                date,
            },
            user.id,
            &conn,
        )?;
    }

    println!("Setting this month's budget...");

    let budget = get_or_create_budget(user.id, Period::from_date(today), Amount::ZERO, &conn)?;
    set_budget_amount(budget.id, user.id, Amount::from_str("250")?, &conn)?;

    println!("Success!");

    Ok(())
}
