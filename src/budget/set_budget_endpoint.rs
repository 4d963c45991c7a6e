//! Defines the endpoint for setting the budget of the current month.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    amount::Amount,
    budget::{
        core::{get_or_create_budget, set_budget_amount},
        summary_page::budget_form,
    },
    endpoints,
    period::Period,
    timezone::local_today,
};

/// The state needed to set a budget.
#[derive(Debug, Clone)]
pub struct SetBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SetBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The raw data entered into the budget form.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    #[serde(default)]
    pub amount: String,
}

/// A route handler for setting the logged in user's budget for the current
/// month, redirects to the dashboard on success.
///
/// An invalid amount is answered with the budget form and an error message,
/// and the stored budget is left unchanged.
pub async fn set_budget_endpoint(
    State(state): State<SetBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let amount = match Amount::from_str(&form.amount) {
        Ok(amount) => amount,
        Err(error) => {
            return budget_form(&form.amount, Some(&error.to_string())).into_response();
        }
    };

    let period = match local_today(&state.local_timezone) {
        Ok(today) => Period::from_date(today),
        Err(error) => {
            tracing::error!("could not get today's date: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = get_or_create_budget(user_id, period, Amount::ZERO, &connection)
        .and_then(|budget| set_budget_amount(budget.id, user_id, amount, &connection));

    match result {
        Ok(()) => {
            tracing::debug!("User {user_id} set their budget for {period} to {amount}");
            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not set budget for {period}: {error}");
            error.into_alert_response()
        }
    }
}
