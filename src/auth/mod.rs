//! User accounts, password handling and cookie based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod sign_up;
mod token;
mod user;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::normalize_redirect_url;
pub use sign_up::{create_user_endpoint, get_sign_up_page};
pub(crate) use token::Token;
pub use user::{
    USERNAME_MAX_LENGTH, User, UserID, Username, create_user, create_user_table,
    get_user_by_id, get_user_by_username, update_password,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
