use axum::{Json, extract::State, http::StatusCode};

use crate::{
    gate::{describe, normalize_path},
    models::{AccessSummary, CheckAccessRequest, DecisionResponse},
    policy::{PolicyState, Session},
};

/// get_my_access
///
/// [Public Route] Describes what the calling session may open. Used by the
/// dashboard to hide navigation entries the gate would bounce anyway.
#[utoipa::path(
    get,
    path = "/api/access/me",
    responses((status = 200, description = "Access summary for the caller", body = AccessSummary))
)]
pub async fn get_my_access(
    session: Session,
    State(policy): State<PolicyState>,
) -> Json<AccessSummary> {
    if !session.present {
        return Json(AccessSummary {
            authenticated: false,
            role: None,
            home: None,
            routes: owned_routes(policy.accessible_routes(None)),
        });
    }

    let role = session.effective_role();
    Json(AccessSummary {
        authenticated: true,
        role: Some(role),
        home: Some(policy.home(role).to_string()),
        routes: owned_routes(policy.accessible_routes(Some(role))),
    })
}

/// check_access
///
/// [Public Route] Dry-runs the gate for a path with the caller's session.
///
/// *Validation*: the path must be absolute; anything else is a 400.
#[utoipa::path(
    post,
    path = "/api/access/check",
    request_body = CheckAccessRequest,
    responses(
        (status = 200, description = "Gate decision", body = DecisionResponse),
        (status = 400, description = "Path is not absolute")
    )
)]
pub async fn check_access(
    session: Session,
    State(policy): State<PolicyState>,
    Json(payload): Json<CheckAccessRequest>,
) -> Result<Json<DecisionResponse>, StatusCode> {
    if !payload.path.starts_with('/') {
        return Err(StatusCode::BAD_REQUEST);
    }

    let path = normalize_path(&payload.path);
    let decision = policy.decide(path, &session);

    Ok(Json(DecisionResponse {
        path: path.to_string(),
        outcome: describe(&decision).to_string(),
        location: decision.location(),
    }))
}

fn owned_routes(routes: Vec<&str>) -> Vec<String> {
    routes.into_iter().map(str::to_string).collect()
}
