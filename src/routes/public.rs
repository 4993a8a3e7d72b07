use crate::AppState;
use axum::{Router, response::Redirect, routing::get};

/// Public Router Module
///
/// Endpoints answered directly by the gate service, before the dashboard bundle.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Unconditional hop into the dashboard. The gate then decides between
        // the login page and the caller's home.
        .route("/", get(|| async { Redirect::temporary("/dashboard") }))
        // GET /health
        // Load balancer check. In scope for the gate, but outside the dashboard
        // root, so it is always allowed.
        .route("/health", get(|| async { "ok" }))
}
