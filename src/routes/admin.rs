use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Provisioning support for administrators. Handlers authenticate through the
/// `Session` extractor and then check the admin role themselves (403 otherwise).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/users
        // Directory listing with each user's landing route.
        .route("/users", get(handlers::get_admin_users))
        // GET /admin/users/{id}/check?path=...
        // Access check evaluated for another user.
        .route("/users/{id}/check", get(handlers::check_user_path))
}
