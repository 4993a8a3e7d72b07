use dashboard_gate::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, route policy, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, otherwise verbose defaults for local work.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dashboard_gate=debug,tower_http=info,axum=trace".into());

    // 3. Pretty logs locally, JSON lines in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if !config.env_explicit {
        tracing::warn!("APP_ENV is not set; defaulting to Local (x-dev-role bypass enabled).");
    }

    // 4. Route policy: built-in table or validated override file.
    let policy = match config.load_policy() {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!("FATAL: route policy rejected: {}", e);
            std::process::exit(1);
        }
    };
    match &config.policy_path {
        Some(path) => tracing::info!("Route policy loaded from {}", path),
        None => tracing::info!("Using built-in route policy"),
    }
    if config.env == Env::Local {
        tracing::warn!("Local mode: the x-dev-role header bypasses session tokens.");
    }

    // 5. State, router, server.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, policy));

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("FATAL: failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}
