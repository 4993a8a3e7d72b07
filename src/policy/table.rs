use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, fs, path::Path, sync::Arc};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use super::engine::{AccessPolicyEngine, Decision, Session};

/// Role
///
/// The access tier carried in the session token's `role` claim.
/// Closed on purpose: anything the token says that is not one of these
/// parses to `None`, and `Session::effective_role` then treats it as `User`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::User];

    /// Exact match against the claim values issued by the identity service.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RouteCategory
///
/// Named groups of route patterns that share an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteCategory {
    /// Reachable by every role (and the login page by anonymous visitors too).
    Common,
    /// Only meaningful for documentation: admins bypass route checks entirely.
    AdminOnly,
    /// The pages a plain user may open.
    User,
}

/// PolicyError
///
/// Failures while loading or validating a `PolicyConfig`. These only occur at
/// startup; once an engine exists it never fails.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read route policy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route policy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("route pattern {0:?} must start with '/'")]
    InvalidPattern(String),

    #[error("home path {path:?} for {owner} must start with '/'")]
    InvalidHome { owner: String, path: String },

    #[error("login path {login:?} is not under the dashboard root {root:?}")]
    LoginOutsideDashboard { login: String, root: String },

    #[error("locale {0:?} must be two lowercase ASCII letters")]
    InvalidLocale(String),

    #[error("callback parameter name must not be empty")]
    EmptyCallbackParam,

    #[error("home path {path:?} is not reachable by role {role}")]
    UnreachableHome { role: Role, path: String },
}

fn default_fallback_home() -> String {
    "/dashboard/profile".to_string()
}

fn default_login_path() -> String {
    "/dashboard/login".to_string()
}

fn default_dashboard_root() -> String {
    "/dashboard".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["az".to_string(), "ru".to_string()]
}

fn default_callback_param() -> String {
    "callbackUrl".to_string()
}

/// PolicyConfig
///
/// The immutable route permission table and role home table, plus the few
/// well-known paths the engine branches on. Built once at process start
/// (either `Default` or a JSON override) and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Category -> ordered route patterns.
    pub routes: BTreeMap<RouteCategory, Vec<String>>,
    /// Role -> landing page.
    pub homes: BTreeMap<Role, String>,
    /// Landing page for a role missing from `homes`.
    #[serde(default = "default_fallback_home")]
    pub fallback_home: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_dashboard_root")]
    pub dashboard_root: String,
    /// Locale prefixes stripped from `/<locale>/dashboard/login`.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    /// Query parameter carrying the original path on login redirects.
    #[serde(default = "default_callback_param")]
    pub callback_param: String,
}

impl Default for PolicyConfig {
    /// The production route table.
    fn default() -> Self {
        let routes = BTreeMap::from([
            (RouteCategory::Common, strings(&["/dashboard/login"])),
            (
                RouteCategory::AdminOnly,
                strings(&[
                    "/dashboard/admin",
                    "/dashboard/settings",
                    "/dashboard/users",
                    "/dashboard/users/create",
                    "/dashboard/users/edit",
                    "/dashboard/contact-info",
                ]),
            ),
            (
                RouteCategory::User,
                strings(&[
                    "/dashboard/student-projects",
                    "/dashboard/student-projects/create",
                    "/dashboard/student-projects/edit",
                    "/dashboard/team",
                    "/dashboard/team/create",
                    "/dashboard/team/edit",
                    "/dashboard/requests",
                    "/dashboard/exams",
                    "/dashboard/gallery",
                    "/dashboard/gallery/create",
                ]),
            ),
        ]);

        let homes = BTreeMap::from([
            (Role::Admin, "/dashboard/requests".to_string()),
            (Role::User, "/dashboard/requests".to_string()),
        ]);

        Self {
            routes,
            homes,
            fallback_home: default_fallback_home(),
            login_path: default_login_path(),
            dashboard_root: default_dashboard_root(),
            locales: default_locales(),
            callback_param: default_callback_param(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PolicyConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads and parses an override file. Does not validate; call `validate`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Patterns listed under a category; empty if the category is absent.
    pub fn routes_for(&self, category: RouteCategory) -> &[String] {
        self.routes
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Table lookup with the fallback home for roles missing from the table.
    pub fn home_for(&self, role: Role) -> &str {
        self.homes
            .get(&role)
            .map(String::as_str)
            .unwrap_or(&self.fallback_home)
    }

    /// Structural checks, then the no-redirect-loop check: every role must be
    /// allowed onto its own home page.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for pattern in self.routes.values().flatten() {
            if !pattern.starts_with('/') {
                return Err(PolicyError::InvalidPattern(pattern.clone()));
            }
        }

        for (role, path) in &self.homes {
            if !path.starts_with('/') {
                return Err(PolicyError::InvalidHome {
                    owner: role.to_string(),
                    path: path.clone(),
                });
            }
        }
        if !self.fallback_home.starts_with('/') {
            return Err(PolicyError::InvalidHome {
                owner: "fallback".to_string(),
                path: self.fallback_home.clone(),
            });
        }

        if !self.login_path.starts_with(&self.dashboard_root) {
            return Err(PolicyError::LoginOutsideDashboard {
                login: self.login_path.clone(),
                root: self.dashboard_root.clone(),
            });
        }

        if let Some(bad) = self
            .locales
            .iter()
            .find(|l| l.len() != 2 || !l.bytes().all(|b| b.is_ascii_lowercase()))
        {
            return Err(PolicyError::InvalidLocale(bad.clone()));
        }

        if self.callback_param.is_empty() {
            return Err(PolicyError::EmptyCallbackParam);
        }

        let engine = AccessPolicyEngine::new(Arc::new(self.clone()));
        for role in Role::ALL {
            let home = engine.home(role);
            if engine.decide(home, &Session::authenticated(role)) != Decision::Allow {
                return Err(PolicyError::UnreachableHome {
                    role,
                    path: home.to_string(),
                });
            }
        }

        Ok(())
    }
}
