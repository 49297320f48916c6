//! Passcode authentication backed by an encrypted auth cookie.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod token;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{hash_passcode, post_log_in};
pub use log_out::get_log_out;
pub use middleware::auth_guard;
use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
