use axum::{body::Body, response::Response};
use scraper::{ElementRef, Html, Selector};

async fn response_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    String::from_utf8_lossy(&body).into_owned()
}

/// Parse a full page, e.g. the dashboard or the expenses list.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parse an htmx fragment, e.g. a re-rendered form or an alert.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// The trimmed text of the first element matching `selector`.
#[track_caller]
pub(crate) fn must_get_text(html: &Html, selector: &str) -> String {
    html.select(&Selector::parse(selector).unwrap())
        .next()
        .unwrap_or_else(|| panic!("No element found for {selector:?}"))
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}

/// The text of the alert in an htmx error response.
#[track_caller]
pub(crate) fn must_get_alert_text(html: &Html) -> String {
    must_get_text(html, "[role=alert]")
}

/// The rows of an expense table, skipping the placeholder row shown when
/// there are no expenses.
pub(crate) fn expense_rows(html: &Html) -> Vec<ElementRef<'_>> {
    html.select(&Selector::parse("tbody tr[data-expense-id]").unwrap())
        .collect()
}
