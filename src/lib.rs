//! Spendlog is a web app for keeping track of everyday expenses against a
//! monthly budget.
//!
//! This library provides a web server that directly serves HTML pages.
//! Users sign up and log in with a username and password, record expenses,
//! set a budget for the current month, and see how their spending compares.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod amount;
mod app_state;
mod auth;
mod budget;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod period;
mod routing;
mod summary;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use amount::{Amount, AmountError};
pub use app_state::AppState;
pub use auth::{
    PasswordHash, USERNAME_MAX_LENGTH, User, UserID, Username, ValidatedPassword, create_user,
    get_user_by_username, update_password,
};
pub use budget::{
    Budget, BudgetId, create_budget, get_budget, get_or_create_budget, set_budget_amount,
};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{Expense, NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::Period;
pub use routing::build_router;
pub use summary::{BudgetSummary, compute_summary, is_over_budget};
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
