//! Defines the expense model and the database queries for expenses.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{Error, UserID, amount::Amount, period::Period};

/// The database ID of an expense.
pub type ExpenseId = i64;

/// Money spent by a user on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user that recorded the expense.
    pub user_id: UserID,
    /// How much was spent.
    pub amount: Amount,
    /// A short label used to group expenses, e.g. "Groceries".
    pub category: String,
    /// What the money was spent on.
    pub description: String,
    /// The day the money was spent.
    pub date: Date,
}

/// The validated fields of an expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// How much was spent.
    pub amount: Amount,
    /// A short label used to group expenses, e.g. "Groceries".
    pub category: String,
    /// What the money was spent on.
    pub description: String,
    /// The day the money was spent.
    pub date: Date,
}

const SELECT_EXPENSE_COLUMNS: &str =
    "SELECT id, user_id, amount, category, description, date FROM expense";

/// Save `new_expense` for the user `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error,
/// e.g. `user_id` does not refer to a registered user.
pub fn create_expense(
    new_expense: NewExpense,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (user_id, amount, category, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, amount, category, description, date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_expense.amount,
                new_expense.category,
                new_expense.description,
                new_expense.date,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Get all of the expenses for `user_id`, most recent first.
///
/// Expenses on the same day are ordered by the order they were created in,
/// newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_expenses(user_id: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE_COLUMNS} WHERE user_id = :user_id ORDER BY date DESC, id DESC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Get the `limit` most recent expenses for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_recent_expenses(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE_COLUMNS} WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), limit), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Get the expenses for `user_id` dated within `period`, most recent first.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDate] if the period's year is out of range,
/// - or [Error::SqlError] if there is some SQL error.
pub fn get_expenses_in_period(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let first_day = period.first_day()?;

    connection
        .prepare(&format!(
            "{SELECT_EXPENSE_COLUMNS}
             WHERE user_id = ?1 AND date >= ?2 AND date < date(?2, '+1 month')
             ORDER BY date DESC, id DESC"
        ))?
        .query_map((user_id.as_i64(), first_day), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Get the number of expenses recorded by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_expenses(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM expense WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Delete the expense `expense_id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if there is no expense with `expense_id`
///   that belongs to `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
        (),
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
    })
}
