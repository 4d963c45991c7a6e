//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the database functions for storing and querying expenses
//! - The expense form and its validation
//! - The pages and endpoints for adding, listing and deleting expenses

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod expenses_page;
mod form;

pub use core::{
    Expense, ExpenseId, NewExpense, count_expenses, create_expense, create_expense_table,
    get_expenses_in_period, list_expenses, list_recent_expenses,
};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_new_expense_page;
pub use delete_endpoint::delete_expense_endpoint;
pub use expenses_page::get_expenses_page;
pub(crate) use expenses_page::expense_table;

#[cfg(test)]
pub use core::delete_expense;
