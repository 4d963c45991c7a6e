//! Displays the user's expenses, most recent first.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    endpoints::{self, format_endpoint},
    expense::{Expense, core::list_expenses},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The button that deletes `expense` and then reloads the expense list.
pub(crate) fn delete_expense_button(expense: &Expense) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
    let confirm_message = format!(
        "Are you sure you want to delete the expense '{}'? This cannot be undone.",
        expense.description
    );

    html! {
        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target-error="#alert-container"
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

pub(crate) fn expense_table(expenses: &[Expense]) -> Markup {
    html! {
        div class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:mx-auto"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                time datetime=(expense.date) { (expense.date) }
                            }
                            td class=(TABLE_CELL_STYLE) { (expense.category) }
                            td class=(TABLE_CELL_STYLE) { (expense.description) }
                            td class="px-6 py-4 text-right tabular-nums"
                            {
                                (format_currency(expense.amount.as_decimal()))
                            }
                            td class=(TABLE_CELL_STYLE) { (delete_expense_button(expense)) }
                        }
                    }

                    @if expenses.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No expenses yet. Add one "
                                a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "here" }
                                "."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn expenses_view(expenses: &[Expense]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                }

                (expense_table(expenses))
            }
        }
    };

    base("Expenses", &[], &content)
}

/// Display every expense of the logged in user in a table, most recent first.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_expenses(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not list expenses: {error}"))?
    };

    Ok(expenses_view(&expenses).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        UserID,
        amount::Amount,
        auth::{PasswordHash, Username, create_user},
        db::initialize,
        endpoints::{self, format_endpoint},
        expense::{NewExpense, create_expense},
        test_utils::{assert_status_ok, assert_valid_html, expense_rows, parse_html_document},
    };

    use super::{ExpensesPageState, get_expenses_page};

    fn get_test_state() -> (ExpensesPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Username::new("alice").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            ExpensesPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn add_expense(state: &ExpensesPageState, user_id: UserID, amount: &str, date: time::Date) {
        create_expense(
            NewExpense {
                amount: amount.parse::<Amount>().unwrap(),
                category: "Food".to_owned(),
                description: format!("Lunch on {date}"),
                date,
            },
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn lists_expenses_most_recent_first() {
        let (state, user_id) = get_test_state();
        add_expense(&state, user_id, "5.00", date!(2026 - 10 - 01));
        add_expense(&state, user_id, "7.50", date!(2026 - 10 - 15));

        let response = get_expenses_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let rows = expense_rows(&document);
        assert_eq!(rows.len(), 2);
        let first_row_text = rows[0].text().collect::<String>();
        assert!(first_row_text.contains("2026-10-15"), "got {first_row_text}");
        assert!(first_row_text.contains("$7.50"), "got {first_row_text}");
    }

    #[tokio::test]
    async fn rows_have_delete_buttons() {
        let (state, user_id) = get_test_state();
        add_expense(&state, user_id, "5.00", date!(2026 - 10 - 01));

        let response = get_expenses_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let button = document
            .select(&Selector::parse("tbody button[hx-delete]").unwrap())
            .next()
            .expect("No delete button found");
        assert_eq!(
            button.value().attr("hx-delete"),
            Some(format_endpoint(endpoints::DELETE_EXPENSE, 1).as_str())
        );
    }

    #[tokio::test]
    async fn empty_list_links_to_new_expense_page() {
        let (state, user_id) = get_test_state();

        let response = get_expenses_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert!(expense_rows(&document).is_empty());
        let link = document
            .select(&Selector::parse("tbody a").unwrap())
            .next()
            .expect("No link found");
        assert_eq!(link.value().attr("href"), Some(endpoints::NEW_EXPENSE_VIEW));
    }

    #[tokio::test]
    async fn only_shows_own_expenses() {
        let (state, user_id) = get_test_state();
        let other_user = create_user(
            Username::new("bob").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        add_expense(&state, other_user.id, "5.00", date!(2026 - 10 - 01));

        let response = get_expenses_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert!(expense_rows(&document).is_empty());
    }
}
