//! Authentication middleware that checks the auth cookie, extends sessions and
//! sends anonymous users to the log-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// How long a session is kept alive after each request.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How to send an anonymous user to the log-in page.
#[derive(Clone, Copy)]
enum LogInRedirect {
    /// A 303 redirect, for full page requests.
    Browser,
    /// An `HX-Redirect` header, for HTMX requests.
    Htmx,
}

impl LogInRedirect {
    fn to(self, redirect_url: &str) -> Response {
        match self {
            LogInRedirect::Browser => Redirect::to(redirect_url).into_response(),
            LogInRedirect::Htmx => {
                (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
            }
        }
    }
}

async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    log_in_redirect: LogInRedirect,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not get redirect URL for {}. Falling back to dashboard.",
            request.uri()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Invalid timezone {}. Redirecting to log in page.",
            state.local_timezone
        );
        return log_in_redirect.to(&log_in_redirect_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return log_in_redirect.to(&log_in_redirect_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri);
            return log_in_redirect.to(&log_in_redirect_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION, local_offset)
        .unwrap_or_else(|error| {
            tracing::error!("Error extending cookie duration: {error}. Keeping old cookie.");
            jar
        });

    let (mut parts, body) = response.into_parts();
    let jar_response = jar.into_response();
    for cookie in jar_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware for page routes that checks for a valid auth cookie.
///
/// The user ID is placed into the request extensions and the request is run
/// normally if the cookie is valid, otherwise the client is redirected to the
/// log-in page.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Browser).await
}

/// Middleware for `/api` routes that checks for a valid auth cookie.
///
/// Same as [auth_guard], except that the redirect to the log-in page is sent
/// as an `HX-Redirect` header so that HTMX performs a full page navigation.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}
