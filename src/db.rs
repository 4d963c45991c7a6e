//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{auth::create_user_table, budget::create_budget_table, expense::create_expense_table};

/// Create the tables for users, expenses and budgets if they do not already exist.
///
/// The tables are created in a single exclusive transaction, so either all of
/// them are created or none are.
///
/// # Errors
///
/// Returns an error if foreign keys cannot be enabled or any of the tables
/// could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()
}
