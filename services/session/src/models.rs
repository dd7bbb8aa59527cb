//! Session and organization models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-held session created at successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub user_id: String,
    pub user_name: Option<String>,
    /// Chooses the storage scope owning this session: `true` keeps the
    /// session across restarts, `false` scopes it to the current process
    pub remember: bool,
}

/// Request for user login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for user login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub id: String,
    /// Organization pre-selected by the server, when it already knows one
    #[serde(default)]
    pub organization_code: Option<String>,
    /// When set, the user must change their password before a session may
    /// be persisted
    #[serde(default)]
    pub first_access: bool,
}

/// Organization the user is a member of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

/// One entry of the user's organization membership list
///
/// Only `organization.code` and `organization.name` are used by the client
/// core; the subscription payload is carried opaquely for the billing
/// screens.
#[derive(Debug, Clone, Deserialize)]
pub struct Membership {
    pub organization: Organization,
    #[serde(default)]
    pub subscription: Option<serde_json::Value>,
}
