use std::{collections::BTreeMap, sync::Arc};

use super::{
    matcher::RouteMatcher,
    table::{PolicyConfig, Role, RouteCategory},
};

/// Session
///
/// The two facts the engine needs about the caller: whether a session token
/// was presented at all, and the role it carried (if it could be read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub present: bool,
    pub role: Option<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(role: Role) -> Self {
        Self {
            present: true,
            role: Some(role),
        }
    }

    /// A present session whose role comes from a raw, unverified claim value.
    pub fn from_claim(raw_role: Option<&str>) -> Self {
        Self {
            present: true,
            role: raw_role.and_then(Role::parse),
        }
    }

    /// The role decisions are made with: the claimed one, else `User`.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::User)
    }
}

/// Decision
///
/// What the gate should do with a request. Building the final `Location`
/// (path plus encoded query) is left to the caller; see `Decision::location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect {
        target: String,
        query: BTreeMap<String, String>,
    },
}

impl Decision {
    pub fn redirect(target: impl Into<String>) -> Self {
        Decision::Redirect {
            target: target.into(),
            query: BTreeMap::new(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// `target?k=v` with form-urlencoded parameters, or `None` for `Allow`.
    pub fn location(&self) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::Redirect { target, query } if query.is_empty() => Some(target.clone()),
            Decision::Redirect { target, query } => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(query.iter())
                    .finish();
                Some(format!("{target}?{encoded}"))
            }
        }
    }
}

/// AccessPolicyEngine
///
/// Pure decision function over an immutable `PolicyConfig`. The route lists
/// are compiled into matchers once, in `new`; `decide` never allocates more
/// than the redirect it returns and never fails.
#[derive(Debug, Clone)]
pub struct AccessPolicyEngine {
    config: Arc<PolicyConfig>,
    common: RouteMatcher,
    admin_only: RouteMatcher,
    user: RouteMatcher,
}

/// PolicyState
///
/// Shared handle to the engine held in the application state.
pub type PolicyState = Arc<AccessPolicyEngine>;

impl AccessPolicyEngine {
    pub fn new(config: Arc<PolicyConfig>) -> Self {
        let common = RouteMatcher::new(config.routes_for(RouteCategory::Common));
        let admin_only = RouteMatcher::new(config.routes_for(RouteCategory::AdminOnly));
        let user = RouteMatcher::new(config.routes_for(RouteCategory::User));
        Self {
            config,
            common,
            admin_only,
            user,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// decide
    ///
    /// Rule order matters and each step short-circuits:
    /// 1. `/<locale>/dashboard/login...` redirects to the path without the locale.
    /// 2. Anything outside the dashboard root is allowed.
    /// 3. The login page: signed-in users go home, everyone else sees it.
    /// 4. Other dashboard pages: anonymous -> login (with callback), the root
    ///    itself -> home, otherwise the role check, with home as the deny target.
    pub fn decide(&self, path: &str, session: &Session) -> Decision {
        if let Some(stripped) = self.strip_locale_login(path) {
            return Decision::redirect(stripped);
        }

        let config = &self.config;
        if !path.starts_with(config.dashboard_root.as_str()) {
            return Decision::Allow;
        }

        if path == config.login_path {
            return if session.present {
                Decision::redirect(self.home(session.effective_role()))
            } else {
                Decision::Allow
            };
        }

        if !session.present {
            return self.login_redirect(path);
        }

        let role = session.effective_role();
        if path == config.dashboard_root {
            return Decision::redirect(self.home(role));
        }

        if self.has_route_access(path, role) {
            Decision::Allow
        } else {
            Decision::redirect(self.home(role))
        }
    }

    /// Boundary form taking the raw claim string as it came out of the token.
    pub fn decide_raw(
        &self,
        path: &str,
        session_present: bool,
        raw_role_claim: Option<&str>,
    ) -> Decision {
        let session = if session_present {
            Session::from_claim(raw_role_claim)
        } else {
            Session::anonymous()
        };
        self.decide(path, &session)
    }

    /// COMMON routes for everyone, everything for admins, USER routes for users.
    pub fn has_route_access(&self, path: &str, role: Role) -> bool {
        if self.common.matches(path) {
            return true;
        }
        match role {
            Role::Admin => true,
            Role::User => self.user.matches(path),
        }
    }

    pub fn home(&self, role: Role) -> &str {
        self.config.home_for(role)
    }

    /// Route patterns a caller may open, in table order. Anonymous callers
    /// (`None`) only get the COMMON routes.
    pub fn accessible_routes(&self, role: Option<Role>) -> Vec<&str> {
        let matchers = match role {
            None => vec![&self.common],
            Some(Role::User) => vec![&self.common, &self.user],
            Some(Role::Admin) => vec![&self.common, &self.admin_only, &self.user],
        };
        matchers
            .into_iter()
            .flat_map(|m| m.patterns())
            .map(|p| p.route())
            .collect()
    }

    fn strip_locale_login<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix('/')?;
        let (locale, tail) = rest.split_at_checked(2)?;
        if !self.config.locales.iter().any(|l| l == locale) {
            return None;
        }
        tail.starts_with(self.config.login_path.as_str())
            .then_some(tail)
    }

    fn login_redirect(&self, path: &str) -> Decision {
        let mut query = BTreeMap::new();
        if path != self.config.login_path {
            query.insert(self.config.callback_param.clone(), path.to_string());
        }
        Decision::Redirect {
            target: self.config.login_path.clone(),
            query,
        }
    }
}
