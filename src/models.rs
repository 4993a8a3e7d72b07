use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::policy::Role;

// --- Response Schemas ---

/// AccessSummary
///
/// What the current caller may open, as the dashboard sidebar needs it.
/// Anonymous callers get `authenticated = false`, no role and only the
/// routes every visitor can reach.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct AccessSummary {
    pub authenticated: bool,
    // Effective role (claim, or USER when the claim is missing/unknown).
    pub role: Option<Role>,
    // Landing page for that role.
    pub home: Option<String>,
    // Route patterns reachable by the caller, in table order.
    pub routes: Vec<String>,
}

/// DecisionResponse
///
/// The gate's verdict for a path, for the calling session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct DecisionResponse {
    pub path: String,
    // "allow" or "redirect".
    pub outcome: String,
    // Full redirect target including the encoded query, when redirecting.
    pub location: Option<String>,
}

// --- Request Payloads ---

/// CheckAccessRequest
///
/// Input for POST /api/access/check.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CheckAccessRequest {
    pub path: String,
}
