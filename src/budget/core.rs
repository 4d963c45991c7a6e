//! Defines the monthly budget model and the database queries for budgets.

use rusqlite::{Connection, Row, types::Type};
use time::Month;

use crate::{Error, UserID, amount::Amount, period::Period};

/// The database ID of a budget.
pub type BudgetId = i64;

/// How much a user plans to spend in one month.
///
/// An amount of zero means the user has not set a budget for the month.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user the budget belongs to.
    pub user_id: UserID,
    /// The month the budget covers.
    pub period: Period,
    /// How much the user plans to spend in the month.
    pub amount: Amount,
}

/// Get the budget for `user_id` in `period`, creating it with
/// `default_amount` if it does not exist yet.
///
/// Calling this any number of times, including from concurrent requests,
/// leaves exactly one budget for the user and period.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_or_create_budget(
    user_id: UserID,
    period: Period,
    default_amount: Amount,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, month, year, amount) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, month, year) DO NOTHING",
        (
            user_id.as_i64(),
            period.month_number(),
            period.year,
            default_amount,
        ),
    )?;

    get_budget(user_id, period, connection)
}

/// Create the budget for `user_id` in `period`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the user already has a budget for `period`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    period: Period,
    amount: Amount,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "INSERT INTO budget (user_id, month, year, amount) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, month, year, amount",
        )?
        .query_row(
            (user_id.as_i64(), period.month_number(), period.year, amount),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Get the budget for `user_id` in `period`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the user has no budget for `period`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "SELECT id, user_id, month, year, amount FROM budget
             WHERE user_id = ?1 AND month = ?2 AND year = ?3",
        )?
        .query_row(
            (user_id.as_i64(), period.month_number(), period.year),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Overwrite the amount of the budget `budget_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBudget] if `budget_id` does not belong to `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_budget_amount(
    budget_id: BudgetId,
    user_id: UserID,
    amount: Amount,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget SET amount = ?1 WHERE id = ?2 AND user_id = ?3",
        (amount, budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                amount TEXT NOT NULL,
                UNIQUE(user_id, month, year),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let month_number: u8 = row.get(2)?;
    let month = Month::try_from(month_number).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        period: Period::new(month, row.get(3)?),
        amount: row.get(4)?,
    })
}

#[cfg(test)]
mod database_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::Month;

    use crate::{
        Error, UserID,
        amount::Amount,
        auth::{PasswordHash, Username, create_user},
        budget::{create_budget, get_budget, get_or_create_budget, set_budget_amount},
        db::initialize,
        period::Period,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            Username::new_unchecked("test"),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (conn, user.id)
    }

    fn count_budgets(conn: &Connection) -> u32 {
        conn.query_row("SELECT COUNT(id) FROM budget", [], |row| row.get(0))
            .unwrap()
    }

    const OCTOBER: Period = Period {
        month: Month::October,
        year: 2026,
    };

    #[test]
    fn get_or_create_creates_zero_budget() {
        let (conn, user_id) = get_test_connection();

        let budget = get_or_create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();

        assert_eq!(budget.user_id, user_id);
        assert_eq!(budget.period, OCTOBER);
        assert_eq!(budget.amount, Amount::ZERO);
    }

    #[test]
    fn get_or_create_twice_returns_same_budget() {
        let (conn, user_id) = get_test_connection();

        let first = get_or_create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();
        let second = get_or_create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();

        assert_eq!(first, second);
        assert_eq!(count_budgets(&conn), 1);
    }

    #[test]
    fn get_or_create_keeps_existing_amount() {
        let (conn, user_id) = get_test_connection();
        let amount = Amount::from_str("250").unwrap();
        let created = create_budget(user_id, OCTOBER, amount, &conn).unwrap();

        let budget = get_or_create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();

        assert_eq!(budget, created);
        assert_eq!(budget.amount.as_decimal(), dec!(250));
    }

    #[test]
    fn budgets_are_per_month() {
        let (conn, user_id) = get_test_connection();
        let november = Period::new(Month::November, 2026);

        let october_budget = get_or_create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();
        let november_budget =
            get_or_create_budget(user_id, november, Amount::ZERO, &conn).unwrap();

        assert_ne!(october_budget.id, november_budget.id);
        assert_eq!(count_budgets(&conn), 2);
    }

    #[test]
    fn create_duplicate_budget_fails() {
        let (conn, user_id) = get_test_connection();
        create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();

        let result = create_budget(user_id, OCTOBER, Amount::ZERO, &conn);

        assert_eq!(result, Err(Error::DuplicateBudget));
        assert_eq!(count_budgets(&conn), 1);
    }

    #[test]
    fn get_missing_budget_fails() {
        let (conn, user_id) = get_test_connection();

        assert_eq!(get_budget(user_id, OCTOBER, &conn), Err(Error::NotFound));
    }

    #[test]
    fn set_amount_overwrites_budget() {
        let (conn, user_id) = get_test_connection();
        let budget = get_or_create_budget(user_id, OCTOBER, Amount::ZERO, &conn).unwrap();
        let amount = Amount::from_str("123.45").unwrap();

        set_budget_amount(budget.id, user_id, amount, &conn).unwrap();

        let updated = get_budget(user_id, OCTOBER, &conn).unwrap();
        assert_eq!(updated.amount.as_decimal(), dec!(123.45));
    }

    #[test]
    fn set_amount_on_missing_budget_fails() {
        let (conn, user_id) = get_test_connection();

        let result = set_budget_amount(42, user_id, Amount::ZERO, &conn);

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }
}
