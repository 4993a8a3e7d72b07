/// Router Module Index
///
/// Page requests are gated by `crate::gate` as a router-wide layer; the modules
/// here only group the handful of endpoints the gate service answers itself.

/// Liveness and the root redirect.
pub mod public;

/// JSON introspection of the access policy for the dashboard frontend.
/// Lives under `/api`, which the gate never intercepts.
pub mod access;
