//! The expense form: its fields, validation and markup.

use std::str::FromStr;

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    amount::Amount,
    endpoints,
    expense::NewExpense,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, amount_input, submit_button,
        text_input,
    },
};

/// The maximum number of characters in an expense category.
pub const CATEGORY_MAX_LENGTH: usize = 50;

/// The maximum number of characters in an expense description.
pub const DESCRIPTION_MAX_LENGTH: usize = 255;

/// The raw values submitted with the expense form.
///
/// Every field is kept as text so that invalid input can be shown back to the
/// user next to its error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

/// Error messages for each field of the expense form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFormErrors {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

fn validate_text(value: &str, field_name: &str, max_length: usize) -> Result<String, String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(format!("{field_name} is required"));
    }

    if value.graphemes(true).count() > max_length {
        return Err(format!("{field_name} must be at most {max_length} characters"));
    }

    Ok(value.to_owned())
}

/// Parse a date in the `YYYY-MM-DD` format sent by date inputs.
fn parse_date(raw_date: &str) -> Result<Date, String> {
    let raw_date = raw_date.trim();

    if raw_date.is_empty() {
        return Err("Date is required".to_owned());
    }

    Date::parse(raw_date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| "Enter a date in the format YYYY-MM-DD".to_owned())
}

impl ExpenseForm {
    /// A blank form with the date set to `date`.
    pub fn with_date(date: Date) -> Self {
        Self {
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// Check every field and build the expense to save.
    ///
    /// # Errors
    ///
    /// Returns the error message for every invalid field.
    pub fn validate(&self) -> Result<NewExpense, ExpenseFormErrors> {
        let amount = Amount::from_str(&self.amount).map_err(|error| error.to_string());
        let category = validate_text(&self.category, "Category", CATEGORY_MAX_LENGTH);
        let description = validate_text(&self.description, "Description", DESCRIPTION_MAX_LENGTH);
        let date = parse_date(&self.date);

        match (amount, category, description, date) {
            (Ok(amount), Ok(category), Ok(description), Ok(date)) => Ok(NewExpense {
                amount,
                category,
                description,
                date,
            }),
            (amount, category, description, date) => Err(ExpenseFormErrors {
                amount: amount.err(),
                category: category.err(),
                description: description.err(),
                date: date.err(),
            }),
        }
    }
}

fn date_input(value: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                required
                value=(value)
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// The form for adding an expense, filled in with `values`.
///
/// The server answers invalid submissions with this form, so it replaces
/// itself when swapped in by HTMX.
pub fn expense_form(values: &ExpenseForm, errors: &ExpenseFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::EXPENSES_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Expense" }

            (amount_input("amount", "Amount", &values.amount, errors.amount.as_deref()))
            (text_input(
                "category",
                "Category",
                &values.category,
                CATEGORY_MAX_LENGTH,
                errors.category.as_deref(),
            ))
            (text_input(
                "description",
                "Description",
                &values.description,
                DESCRIPTION_MAX_LENGTH,
                errors.description.as_deref(),
            ))
            (date_input(&values.date, errors.date.as_deref()))

            (submit_button("Add Expense"))
        }
    }
}
