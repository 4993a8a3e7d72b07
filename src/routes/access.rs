use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Access Router Module
///
/// Nested under `/api/access`. Both endpoints resolve the caller's session the
/// same way the gate does, so the frontend sees exactly what the gate would do.
pub fn access_routes() -> Router<AppState> {
    Router::new()
        // GET /api/access/me
        // Role, home page and reachable route patterns for the caller.
        .route("/me", get(handlers::get_my_access))
        // POST /api/access/check
        // Gate verdict for an arbitrary path, e.g. before client-side navigation.
        .route("/check", post(handlers::check_access))
}
