//! User accounts, sessions and the auth guard for protected routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub(crate) use token::Token;
pub use user::{
    User, UserID, Username, create_user, create_user_table, get_user_by_id, get_user_by_username,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
