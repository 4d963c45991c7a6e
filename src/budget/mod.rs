//! Monthly budgets.
//!
//! Each user has at most one budget per calendar month. The budget for the
//! current month is created with an amount of zero the first time it is
//! needed, and the summary page lets the user change it.

mod core;
mod set_budget_endpoint;
mod summary_page;

pub use core::{
    Budget, BudgetId, create_budget, create_budget_table, get_budget, get_or_create_budget,
    set_budget_amount,
};
pub use set_budget_endpoint::set_budget_endpoint;
pub use summary_page::get_summary_page;
