use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod service;

/// Client-visible response messages, shared between the service and the
/// error mapping so the wire contract stays in one place.
pub(crate) mod messages {
    pub const EMAIL_ALREADY_EXISTS: &str = "Email already registered";
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const INCORRECT_PASSWORD: &str = "Current password is incorrect";
    pub const PASSWORD_CHANGED: &str = "Password changed successfully";
    pub const ACCOUNT_DELETED: &str = "Account deleted successfully";
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::profile_routes())
}
