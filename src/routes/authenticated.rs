use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in operator. The `Session` extractor middleware on the
/// layer above guarantees every handler here receives a validated session.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The session's role, grants and landing route.
        .route("/me", get(handlers::get_me))
        // GET /access/check?path=...
        // Route guard decision for one front-end path.
        .route("/access/check", get(handlers::check_path))
        // GET /access/navigation
        // Sidebar links the session may follow.
        .route("/access/navigation", get(handlers::get_navigation))
}
