//! The summary page compares this month's spending with the month's budget
//! and holds the form for changing the budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rust_decimal::Decimal;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    amount::Amount,
    budget::{Budget, core::get_or_create_budget},
    endpoints,
    expense::{Expense, expense_table, get_expenses_in_period},
    html::{
        CARD_STYLE, PAGE_CONTAINER_STYLE, amount_input, base, dollar_input_styles,
        format_currency, submit_button,
    },
    navigation::NavBar,
    period::Period,
    summary::{is_over_budget, sum_amounts},
    timezone::local_today,
};

/// The form for setting the budget of the current month.
///
/// Invalid submissions are answered with this form, so it replaces itself
/// when swapped in by HTMX.
pub(super) fn budget_form(amount: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGET_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4"
        {
            (amount_input("amount", "Monthly budget", amount, error_message))
            (submit_button("Save Budget"))
        }
    }
}

/// The figures shown on the summary page.
struct SummaryFigures {
    period: Period,
    total: Decimal,
    budget_amount: Amount,
    is_over_budget: bool,
}

fn summary_card(title: &str, value: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-semibold tabular-nums" { (value) }
        }
    }
}

fn summary_view(figures: &SummaryFigures, expenses: &[Expense]) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();
    let (status, status_style) = if figures.is_over_budget {
        ("Over budget", "text-red-600 dark:text-red-400")
    } else {
        ("Within budget", "text-green-600 dark:text-green-400")
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-6 lg:max-w-5xl"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Summary for " (figures.period) }
                    p id="budget-status" class={ "text-lg font-semibold " (status_style) }
                    {
                        (status)
                    }
                }

                div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
                {
                    (summary_card("Spent this month", &format_currency(figures.total)))
                    (summary_card("Budget", &format_currency(figures.budget_amount.as_decimal())))
                }

                div class=(CARD_STYLE)
                {
                    (budget_form(&figures.budget_amount.to_string(), None))
                }

                h2 class="text-lg font-semibold" { "Expenses in " (figures.period) }

                (expense_table(expenses))
            }
        }
    };

    base("Summary", &[dollar_input_styles()], &content)
}

/// The state needed for the summary page.
#[derive(Debug, Clone)]
pub struct SummaryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display this month's total spending, the month's budget and whether the
/// spending went over it.
///
/// The budget for the month is created with an amount of zero the first time
/// the page is viewed in a month.
pub async fn get_summary_page(
    State(state): State<SummaryPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let period = Period::from_date(local_today(&state.local_timezone)?);

    let (budget, expenses): (Budget, Vec<Expense>) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let budget = get_or_create_budget(user_id, period, Amount::ZERO, &connection)
            .inspect_err(|error| tracing::error!("could not get budget for {period}: {error}"))?;
        let expenses = get_expenses_in_period(user_id, period, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses for {period}: {error}"))?;

        (budget, expenses)
    };

    let total = sum_amounts(&expenses);
    let figures = SummaryFigures {
        period,
        total,
        budget_amount: budget.amount,
        is_over_budget: is_over_budget(total, &budget),
    };

    Ok(summary_view(&figures, &expenses).into_response())
}
