use std::env;

use crate::policy::{PolicyConfig, PolicyError};

/// Local fallback for the token secret. Never accepted in production.
const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the gate's entire configuration state. Immutable once loaded and pulled
/// into handlers and middleware via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local role bypass and log format.
    pub env: Env,
    // False when APP_ENV was absent and `env` fell back to Local.
    pub env_explicit: bool,
    // Secret used to verify session tokens issued by the identity service (HS256).
    pub jwt_secret: String,
    // Cookie the dashboard stores its session token in.
    pub session_cookie_name: String,
    // Optional JSON file overriding the built-in route policy.
    pub policy_path: Option<String>,
    // Directory holding the built dashboard bundle (must contain index.html).
    pub dashboard_dir: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: `Local` enables developer conveniences (the `x-dev-role`
/// header, pretty logs), `Production` turns them off and demands real secrets.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            env_explicit: false,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            session_cookie_name: "accessToken".to_string(),
            policy_path: None,
            dashboard_dir: "dist".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables.
    ///
    /// # Panics
    /// Panics if `SESSION_JWT_SECRET` is missing while `APP_ENV=production`, so the
    /// gate can never start verifying tokens against a well-known secret.
    pub fn load() -> Self {
        let app_env = env::var("APP_ENV").ok();
        let env = match app_env.as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => env::var("SESSION_JWT_SECRET")
                .expect("FATAL: SESSION_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let defaults = Self::default();
        Self {
            env,
            env_explicit: app_env.is_some(),
            jwt_secret,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            policy_path: env::var("ROUTE_POLICY_PATH")
                .ok()
                .filter(|p| !p.is_empty()),
            dashboard_dir: env::var("DASHBOARD_DIST_DIR").unwrap_or(defaults.dashboard_dir),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    /// load_policy
    ///
    /// Resolves the route policy: the override file when `ROUTE_POLICY_PATH` is
    /// set, the built-in table otherwise. Either way the result is validated.
    pub fn load_policy(&self) -> Result<PolicyConfig, PolicyError> {
        let policy = match &self.policy_path {
            Some(path) => PolicyConfig::from_file(path)?,
            None => PolicyConfig::default(),
        };
        policy.validate()?;
        Ok(policy)
    }
}
