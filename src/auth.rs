use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};

use crate::{
    config::{AppConfig, Env},
    policy::{Role, Session},
};

/// Header honoured in `Env::Local` only: supplies the role directly, no token needed.
pub const DEV_ROLE_HEADER: &str = "x-dev-role";

/// Claims
///
/// Payload of the session token minted by the external identity service.
/// Only `exp` and `role` are read; everything else the issuer puts in the
/// token (subject, issued-at, ...) is ignored so its shape cannot break decoding.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub), passed through untyped: issuers use UUIDs, ids or emails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<serde_json::Value>,
    /// Expiration Time (exp). Expired tokens are never trusted for a role.
    pub exp: usize,
    /// Role claim as issued (`"ADMIN"` / `"USER"`). Kept raw so an unexpected
    /// value degrades to `User` instead of failing the whole decode.
    #[serde(default)]
    pub role: Option<String>,
}

/// SessionResolver
///
/// Turns request headers into the `Session` the policy engine consumes. Async so
/// implementations may consult something slower than a local signature check;
/// the gate awaits it exactly once per request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Session;
}

/// SessionState
///
/// The trait object shared through the application state.
pub type SessionState = Arc<dyn SessionResolver>;

/// JwtSessionResolver
///
/// Default resolver: the token is taken from the session cookie, then from an
/// `Authorization: Bearer` header. A token being present is what makes the
/// session present; the role is only read from a token that verifies.
pub struct JwtSessionResolver {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
    env: Env,
}

impl JwtSessionResolver {
    pub fn new(config: &AppConfig) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            cookie_name: config.session_cookie_name.clone(),
            env: config.env.clone(),
        }
    }

    /// Verifies the token and returns its role, or `None` if the token is
    /// unusable or the claim is not a known role.
    pub fn decode_role(&self, token: &str) -> Option<Role> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims.role.as_deref().and_then(Role::parse),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    _ => tracing::debug!("session token rejected: {}", e),
                }
                None
            }
        }
    }

    fn dev_bypass(&self, headers: &HeaderMap) -> Option<Session> {
        if self.env != Env::Local {
            return None;
        }
        let raw = headers.get(DEV_ROLE_HEADER)?.to_str().ok()?;
        Some(Session::from_claim(Some(raw)))
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Session {
        if let Some(session) = self.dev_bypass(headers) {
            return session;
        }

        match extract_token(headers, &self.cookie_name) {
            Some(token) => Session {
                present: true,
                role: self.decode_role(&token),
            },
            None => Session::anonymous(),
        }
    }
}

/// extract_token
///
/// Cookie first (the dashboard's own storage), then a bearer header. Empty
/// values count as absent.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let prefix = format!("{cookie_name}=");
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()));

    if let Some(token) = from_cookie.filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Session Extractor
///
/// Lets handlers take `Session` as an argument. Never rejects: a caller without
/// a usable token is simply an anonymous session.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let resolver = SessionState::from_ref(state);
        Ok(resolver.resolve(&parts.headers).await)
    }
}
