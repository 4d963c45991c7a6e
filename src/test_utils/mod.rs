//! Assertions shared by the page and endpoint tests.
//!
//! Pages are checked by parsing the rendered HTML with `scraper` and looking
//! for the forms, figures and expense rows the handlers are expected to emit.

#![allow(missing_docs)]

mod form;
mod html;
mod http;

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, assert_form_submit_button_with_text, assert_hx_endpoint,
    must_get_form,
};
pub(crate) use html::{
    assert_valid_html, expense_rows, must_get_alert_text, must_get_text, parse_html_document,
    parse_html_fragment,
};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};
