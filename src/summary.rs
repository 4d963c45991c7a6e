//! Derives the monthly budget figures shown on the dashboard and summary pages.
//!
//! Two pages answer "did I go over budget?" differently. The dashboard uses
//! [compute_summary], which reports no remaining budget, no percentage and no
//! overage while the budget is zero. The summary page uses [is_over_budget], a
//! plain comparison that reports any spending against a zero budget as over
//! budget.

use rust_decimal::Decimal;

use crate::{budget::Budget, expense::Expense};

/// The largest percentage of the budget that is displayed.
const MAX_BUDGET_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// The figures for one month of spending against that month's budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    /// The sum of the expenses in the month.
    pub monthly_total: Decimal,
    /// How much of the budget is left, zero once the budget has been spent or
    /// when no budget has been set.
    pub remaining_budget: Decimal,
    /// How much of the budget has been spent as a percentage from 0 to 100.
    pub budget_percentage: Decimal,
    /// How much the spending went over the budget, zero if it did not.
    pub budget_exceeded: Decimal,
}

/// Compute the summary figures for `expenses` against `budget`.
///
/// `expenses` should already be filtered to the owner and period of `budget`.
pub fn compute_summary(expenses: &[Expense], budget: &Budget) -> BudgetSummary {
    let monthly_total = sum_amounts(expenses);
    let budget_amount = budget.amount.as_decimal();

    let raw_remaining = if budget_amount > Decimal::ZERO {
        budget_amount - monthly_total
    } else {
        Decimal::ZERO
    };

    let budget_percentage = if budget_amount > Decimal::ZERO {
        (monthly_total / budget_amount * Decimal::ONE_HUNDRED)
            .round_dp(2)
            .min(MAX_BUDGET_PERCENTAGE)
    } else {
        Decimal::ZERO
    };

    let budget_exceeded = if raw_remaining < Decimal::ZERO {
        raw_remaining.abs()
    } else {
        Decimal::ZERO
    };

    BudgetSummary {
        monthly_total,
        remaining_budget: raw_remaining.max(Decimal::ZERO),
        budget_percentage,
        budget_exceeded,
    }
}

/// Whether `total` is strictly greater than the budget amount.
///
/// Unlike [BudgetSummary::budget_exceeded], this treats a zero budget like
/// any other amount.
pub fn is_over_budget(total: Decimal, budget: &Budget) -> bool {
    total > budget.amount.as_decimal()
}

/// Sum the amounts of `expenses`, zero if there are none.
pub fn sum_amounts(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .map(|expense| expense.amount.as_decimal())
        .sum()
}
