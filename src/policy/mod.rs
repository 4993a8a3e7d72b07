//! Route Access Policy
//!
//! The decision core of the gate. Everything in here is pure and synchronous:
//! the tables are built once at startup, the matcher compiles them, and the
//! engine turns `(path, session)` into an `Allow` or a `Redirect`.
//!
//! Session *resolution* (reading cookies, verifying tokens) lives in `crate::auth`;
//! this module only ever sees the already-resolved `Session`.
pub mod engine;
pub mod matcher;
pub mod table;

pub use engine::{AccessPolicyEngine, Decision, PolicyState, Session};
pub use matcher::{MatchKind, RouteMatcher, RoutePattern, path_matches};
pub use table::{PolicyConfig, PolicyError, Role, RouteCategory};
