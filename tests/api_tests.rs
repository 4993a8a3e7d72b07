use dashboard_gate::{AppConfig, AppState, PolicyConfig, config::Env, create_router};
use std::fs;
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    _dist: TempDir,
}

async fn spawn_app() -> TestApp {
    let dist = tempfile::tempdir().expect("Failed to create bundle dir");
    fs::write(dist.path().join("index.html"), "<html>dashboard</html>")
        .expect("Failed to write index.html");

    let config = AppConfig {
        env: Env::Production,
        dashboard_dir: dist.path().display().to_string(),
        ..AppConfig::default()
    };
    let policy = config.load_policy().expect("built-in policy must validate");
    let router = create_router(AppState::new(config, policy));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        _dist: dist,
    }
}

fn client() -> reqwest::Client {
    // Redirects are the thing under test; never follow them.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = client()
        .get(&format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_root_walks_to_login() {
    let app = spawn_app().await;
    let client = client();

    let response = client
        .get(&format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()["location"], "/dashboard");

    let response = client
        .get(&format!("{}/dashboard", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()["location"],
        "/dashboard/login?callbackUrl=%2Fdashboard"
    );

    let response = client
        .get(&format!("{}/dashboard/login", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let response = client()
        .get(&format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let doc: serde_json::Value = response.json().await.unwrap();
    assert!(doc["paths"]["/api/access/me"].is_object());
    assert!(doc["paths"]["/api/access/check"].is_object());
}
