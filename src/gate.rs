use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, policy::Decision};

/// Leading path prefixes the catch-all scope skips (API calls, framework assets).
const EXCLUDED_PREFIXES: [&str; 5] = ["api", "_next", "public", "_vercel", "favicon.ico"];

/// Locale prefixes that are always in scope (`/az/...`, `/ru/...`).
const SCOPED_LOCALES: [&str; 2] = ["az", "ru"];

/// should_intercept
///
/// Which requests the gate looks at at all. The union of:
/// - `/dashboard` and everything below it,
/// - `/`,
/// - `/az/...` and `/ru/...`,
/// - a catch-all for paths that neither start with an excluded prefix nor
///   contain a `.` (static files).
pub fn should_intercept(path: &str) -> bool {
    if path == "/" || path == "/dashboard" || path.starts_with("/dashboard/") {
        return true;
    }

    let rest = path.strip_prefix('/').unwrap_or(path);

    let locale_scoped = SCOPED_LOCALES.iter().any(|locale| {
        rest.strip_prefix(locale)
            .is_some_and(|r| r.is_empty() || r.starts_with('/'))
    });
    if locale_scoped {
        return true;
    }

    !EXCLUDED_PREFIXES.iter().any(|p| rest.starts_with(p)) && !rest.contains('.')
}

/// normalize_path
///
/// Drops trailing slashes so `/dashboard/team/` and `/dashboard/team` are one
/// route. The root stays `/`.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// gate_middleware
///
/// Applies the access policy to every in-scope request: resolve the session
/// once, decide, then either continue to the inner service or answer with a
/// `307 Temporary Redirect`.
pub async fn gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = normalize_path(request.uri().path()).to_string();
    if !should_intercept(&path) {
        return next.run(request).await;
    }

    let session = state.sessions.resolve(request.headers()).await;
    let decision = state.policy.decide(&path, &session);

    match decision.location() {
        None => {
            tracing::debug!(
                path = %path,
                present = session.present,
                role = ?session.role,
                "gate allowed request"
            );
            next.run(request).await
        }
        Some(location) => {
            tracing::debug!(
                path = %path,
                present = session.present,
                role = ?session.role,
                location = %location,
                "gate redirected request"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}

/// Shorthand used by the access check endpoint to describe a decision.
pub fn describe(decision: &Decision) -> &'static str {
    match decision {
        Decision::Allow => "allow",
        Decision::Redirect { .. } => "redirect",
    }
}
