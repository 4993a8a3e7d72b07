use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use std::{path::Path, sync::Arc};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access policy core: tables, matcher, decision engine.
pub mod policy;
// Session resolution from request headers.
pub mod auth;
// The request-interception layer applying the policy.
pub mod gate;
pub mod config;
pub mod handlers;
pub mod models;

pub mod routes;
use routes::{access, public};

// --- Public Re-exports ---

pub use auth::{JwtSessionResolver, SessionResolver, SessionState};
pub use config::AppConfig;
pub use policy::{AccessPolicyEngine, Decision, PolicyConfig, PolicyState, Role, Session};

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::get_my_access, handlers::check_access),
    components(
        schemas(
            models::AccessSummary, models::DecisionResponse, models::CheckAccessRequest,
            policy::Role,
        )
    ),
    tags(
        (name = "dashboard-gate", description = "Dashboard route access gate")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state: the session resolver, the policy engine and the
/// configuration they were built from.
#[derive(Clone)]
pub struct AppState {
    /// Turns request headers into a `Session`.
    pub sessions: SessionState,
    /// The access policy, compiled once at startup.
    pub policy: PolicyState,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the default JWT resolver and an engine over `policy`.
    pub fn new(config: AppConfig, policy: PolicyConfig) -> Self {
        let sessions = Arc::new(JwtSessionResolver::new(&config)) as SessionState;
        let policy = Arc::new(AccessPolicyEngine::new(Arc::new(policy)));
        Self {
            sessions,
            policy,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for PolicyState {
    fn from_ref(app_state: &AppState) -> PolicyState {
        app_state.policy.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, the dashboard bundle fallback, the gate layer and the
/// observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // Unknown paths fall through to the SPA: real files if they exist,
    // index.html otherwise so client-side routing can take over.
    let dashboard_dir = Path::new(&state.config.dashboard_dir);
    let dashboard = ServeDir::new(dashboard_dir)
        .fallback(ServeFile::new(dashboard_dir.join("index.html")));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api/access", access::access_routes())
        .fallback_service(dashboard)
        // The gate wraps every route above, including the bundle fallback.
        // `should_intercept` decides per path whether it actually applies.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::gate_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, URI and the `x-request-id` set above, so every
/// log line of a request (gate decisions included) is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
