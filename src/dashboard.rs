//! The dashboard gives an overview of the user's spending: all-time totals,
//! how this month compares with the month's budget and the latest expenses.

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
    auth::get_user_by_id,
    budget::get_or_create_budget,
    endpoints,
    expense::{
        Expense, count_expenses, expense_table, get_expenses_in_period, list_expenses,
        list_recent_expenses,
    },
    html::{CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, link},
    navigation::NavBar,
    period::Period,
    summary::{BudgetSummary, compute_summary, sum_amounts},
    timezone::local_today,
};

/// How many of the latest expenses are listed on the dashboard.
const RECENT_EXPENSE_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything shown on the dashboard.
struct DashboardData {
    username: String,
    period: Period,
    total_expense: Decimal,
    total_count: u32,
    budget_amount: Amount,
    summary: BudgetSummary,
    recent_expenses: Vec<Expense>,
}

/// Display a page with an overview of the user's spending.
///
/// The budget for the current month is created with an amount of zero if
/// the user has not set one yet.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let period = Period::from_date(local_today(&state.local_timezone)?);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(user_id, period, &connection)?;

    Ok(dashboard_view(&data).into_response())
}

fn build_dashboard_data(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let user = get_user_by_id(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;

    let all_expenses = list_expenses(user_id, connection)
        .inspect_err(|error| tracing::error!("could not list expenses: {error}"))?;
    let total_count = count_expenses(user_id, connection)
        .inspect_err(|error| tracing::error!("could not count expenses: {error}"))?;

    let budget = get_or_create_budget(user_id, period, Amount::ZERO, connection)
        .inspect_err(|error| tracing::error!("could not get budget for {period}: {error}"))?;
    let monthly_expenses = get_expenses_in_period(user_id, period, connection)
        .inspect_err(|error| tracing::error!("could not get expenses for {period}: {error}"))?;

    let recent_expenses = list_recent_expenses(user_id, RECENT_EXPENSE_COUNT, connection)
        .inspect_err(|error| tracing::error!("could not get recent expenses: {error}"))?;

    Ok(DashboardData {
        username: user.username.to_string(),
        period,
        total_expense: sum_amounts(&all_expenses),
        total_count,
        budget_amount: budget.amount,
        summary: compute_summary(&monthly_expenses, &budget),
        recent_expenses,
    })
}

fn figure_card(id: &str, title: &str, value: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h2 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-semibold tabular-nums" { (value) }
        }
    }
}

fn budget_progress_bar(percentage: Decimal) -> Markup {
    let bar_style = if percentage >= Decimal::ONE_HUNDRED {
        "h-2.5 rounded-full bg-red-600"
    } else {
        "h-2.5 rounded-full bg-blue-600"
    };

    html! {
        div class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
        {
            div class=(bar_style) style={ "width: " (percentage.normalize()) "%" } {}
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let summary = &data.summary;

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-6 lg:max-w-5xl"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Welcome back, " (data.username) }
                    p class="text-gray-500 dark:text-gray-400" { "Your spending for " (data.period) }
                }

                div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
                {
                    (figure_card("total-expense", "Total spent", &format_currency(data.total_expense)))
                    (figure_card("total-count", "Expenses recorded", &data.total_count.to_string()))
                }

                div class={ (CARD_STYLE) " space-y-4" }
                {
                    div class="flex justify-between flex-wrap items-end"
                    {
                        h2 class="text-lg font-semibold" { "Monthly budget" }
                        a href=(endpoints::SUMMARY_VIEW) class=(LINK_STYLE) { "Change budget" }
                    }

                    div class="grid grid-cols-2 lg:grid-cols-4 gap-4"
                    {
                        (figure_card("monthly-total", "Spent this month", &format_currency(summary.monthly_total)))
                        (figure_card("budget-amount", "Budget", &format_currency(data.budget_amount.as_decimal())))
                        (figure_card("remaining-budget", "Remaining", &format_currency(summary.remaining_budget)))
                        (figure_card("budget-percentage", "Used", &format!("{}%", summary.budget_percentage.normalize())))
                    }

                    (budget_progress_bar(summary.budget_percentage))

                    @if summary.budget_exceeded > Decimal::ZERO {
                        p id="budget-exceeded" class="font-semibold text-red-600 dark:text-red-400"
                        {
                            "You have gone over your budget by "
                            (format_currency(summary.budget_exceeded))
                            "."
                        }
                    }
                }

                div class="flex justify-between flex-wrap items-end"
                {
                    h2 class="text-lg font-semibold" { "Recent expenses" }
                    (link(endpoints::EXPENSES_VIEW, "View all"))
                }

                (expense_table(&data.recent_expenses))
            }
        }
    };

    base("Dashboard", &[], &content)
}
