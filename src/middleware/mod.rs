mod auth;
mod error_handler;

pub use auth::{CurrentUser, auth_context};
pub use error_handler::log_errors;
