use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that need no session. None of them reveal user data.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /pages
        // The static page catalogue (display name -> route).
        .route("/pages", get(handlers::get_pages))
        // GET /access/landing
        // Post-login redirect target; "/login" for anonymous visitors.
        .route("/access/landing", get(handlers::get_landing))
}
