//! The sign-up page and the endpoint for creating new users.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, USERNAME_MAX_LENGTH, Username, ValidatedPassword, create_user},
    endpoints,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link, log_in_sign_up,
        password_input, submit_button, text_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the browser asks for before submitting.
///
/// The server still checks the password strength on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm_password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// Error messages for each field of the sign-up form.
#[derive(Default)]
struct SignUpErrors<'a> {
    username: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn sign_up_form(username: &str, errors: SignUpErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", username, USERNAME_MAX_LENGTH, errors.username))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            (submit_button("Sign up"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let sign_up_form = sign_up_form("", SignUpErrors::default());
    let content = log_in_sign_up("Create an account", &sign_up_form);

    base("Sign Up", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new user from the sign-up form and send the client to the log-in page.
///
/// Invalid input is sent back as the form with error messages under the
/// offending fields.
pub async fn create_user_endpoint(
    State(state): State<SignUpState>,
    Form(user_data): Form<SignUpForm>,
) -> Response {
    let raw_username = user_data.username.trim();

    let username = match Username::new(raw_username) {
        Ok(username) => username,
        Err(error) => {
            let message = error.to_string();
            let errors = SignUpErrors {
                username: Some(&message),
                ..Default::default()
            };
            return sign_up_form(raw_username, errors).into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password, &[username.as_ref()])
    {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            let errors = SignUpErrors {
                password: Some(&message),
                ..Default::default()
            };
            return sign_up_form(raw_username, errors).into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        let errors = SignUpErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        };
        return sign_up_form(raw_username, errors).into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, state.password_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    match create_user(username, password_hash, &connection) {
        Ok(user) => {
            tracing::info!("Created user {} ({})", user.username, user.id);
            (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateUsername(_)) => {
            let message = error.to_string();
            let errors = SignUpErrors {
                username: Some(&message),
                ..Default::default()
            };
            sign_up_form(raw_username, errors).into_response()
        }
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod sign_up_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::get_sign_up_page;

    #[tokio::test]
    async fn sign_up_page_displays_form() {
        let response = get_sign_up_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button_with_text(&form, "Sign up");
    }
}

#[cfg(test)]
mod create_user_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::Response};
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, Username, create_user, get_user_by_username},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, must_get_form, parse_html_fragment,
        },
    };

    use super::{SignUpForm, SignUpState, create_user_endpoint};

    const STRONG_PASSWORD: &str = "roostersgocockledoodledoo";

    fn get_test_state() -> SignUpState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SignUpState {
            db_connection: Arc::new(Mutex::new(connection)),
            password_cost: 4,
        }
    }

    fn sign_up_form(username: &str, password: &str, confirm_password: &str) -> SignUpForm {
        SignUpForm {
            username: username.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn assert_form_error(response: Response, want_error_message: &str) {
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let form = must_get_form(&fragment);
        assert_form_error_message(&form, want_error_message);
    }

    #[tokio::test]
    async fn creates_user_and_redirects_to_log_in() {
        let state = get_test_state();

        let response = create_user_endpoint(
            State(state.clone()),
            Form(sign_up_form(" alice ", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::LOG_IN_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn rejects_invalid_username() {
        let response = create_user_endpoint(
            State(get_test_state()),
            Form(sign_up_form("alice smith", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let form = must_get_form(&fragment);
        let error = scraper::Selector::parse("p").unwrap();
        assert!(form.select(&error).next().is_some());
    }

    #[tokio::test]
    async fn rejects_weak_password() {
        let response = create_user_endpoint(
            State(get_test_state()),
            Form(sign_up_form("alice", "password1234", "password1234")),
        )
        .await;

        let want = Error::TooWeak(String::new()).to_string();
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let form = must_get_form(&fragment);
        let message = form
            .select(&scraper::Selector::parse("p").unwrap())
            .next()
            .expect("No error message found")
            .text()
            .collect::<String>();
        assert!(message.starts_with(want.trim()), "got {message:?}");
    }

    #[tokio::test]
    async fn rejects_mismatched_passwords() {
        let response = create_user_endpoint(
            State(get_test_state()),
            Form(sign_up_form("alice", STRONG_PASSWORD, "roostersgocockledoodledon't")),
        )
        .await;

        assert_form_error(response, "Passwords do not match").await;
    }

    #[tokio::test]
    async fn rejects_taken_username() {
        let state = get_test_state();
        create_user(
            Username::new("alice").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = create_user_endpoint(
            State(state),
            Form(sign_up_form("alice", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_form_error(
            response,
            &Error::DuplicateUsername("alice".to_owned()).to_string(),
        )
        .await;
    }
}
