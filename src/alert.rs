//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as fragments that HTMX swaps into the alert container
//! defined in [crate::html::base].

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert message to show the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An error with a short message and a longer explanation.
    Error { message: String, details: String },
    /// A success message without any details.
    SuccessSimple { message: String },
}

const ALERT_BASE_STYLE: &str = "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow";
const ALERT_ERROR_STYLE: &str = "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400";
const ALERT_SUCCESS_STYLE: &str = "text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400";

impl Alert {
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Error { message, details } => (ALERT_ERROR_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (ALERT_SUCCESS_STYLE, message, None),
        };

        html! {
            div
                role="alert"
                class={ (ALERT_BASE_STYLE) " " (style) }
            {
                div class="flex-1"
                {
                    span class="font-medium" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty()) {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Close"
                    class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex h-8 w-8 \
                        items-center justify-center hover:bg-gray-200 dark:hover:bg-gray-700"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "✕"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::test_utils::must_get_alert_text;

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let markup = Alert::Error {
            message: "Could not delete expense".to_owned(),
            details: "Try again.".to_owned(),
        }
        .into_html();

        let html = Html::parse_fragment(&markup.into_string());
        let text = must_get_alert_text(&html);

        assert!(text.contains("Could not delete expense"));
        assert!(text.contains("Try again."));
    }

    #[test]
    fn success_alert_has_no_details() {
        let markup = Alert::SuccessSimple {
            message: "Saved".to_owned(),
        }
        .into_html();

        let html = Html::parse_fragment(&markup.into_string());
        let paragraphs = html.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(paragraphs, 0);
    }
}
