use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::Role;

// --- Raw Descriptors (Provided by the Authentication Collaborator) ---

/// UserRecord
///
/// The raw user descriptor as held in the user directory. Every grant field is
/// free text and may be absent, null or empty; `access::UserAccess::from_record`
/// is the only place these strings are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    // Free-text role label, e.g. "Operator" or "Super Admin".
    #[serde(default)]
    pub role: Option<String>,
    // Preferred over `role` when present and non-empty.
    #[serde(default, rename = "userType")]
    pub user_type: Option<String>,
    // Comma-separated coarse system names ("batchcode, o2d").
    #[serde(default)]
    pub system_access: Option<String>,
    // Comma-separated page names or raw routes ("Hot Coil, /calendar").
    #[serde(default)]
    pub page_access: Option<String>,
    // Legacy column consulted only when `page_access` is empty.
    #[serde(default)]
    pub user_access: Option<String>,
}

// --- Response Schemas (Output) ---

/// NavLink
///
/// One entry of the page catalogue: a display name and the route it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavLink {
    pub name: String,
    pub route: String,
}

/// AccessDecision
///
/// Output of a path check. `path` echoes the requested path verbatim,
/// including any `?tab=` suffix.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessDecision {
    pub path: String,
    pub allowed: bool,
}

/// LandingResponse
///
/// Post-login redirection target.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LandingResponse {
    #[schema(example = "/batchcode/hot-coil")]
    pub path: String,
}

/// SessionProfile
///
/// Output schema for the authenticated session (GET /me): the validated
/// grants the resolver works with, plus the landing route.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub role_label: String,
    pub systems: Vec<String>,
    // Resolved page routes in grant order.
    pub pages: Vec<String>,
    pub landing_path: String,
    // Absent for sessions established through the local header bypass.
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// UserSummary
///
/// Directory listing row for administrators (GET /admin/users).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub landing_path: String,
}
