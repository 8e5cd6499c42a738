//! Account registry and session models.

use serde::{Deserialize, Serialize};

/// Role of a registered identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Public,
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    /// Management roles see the staff dashboard; only they may transition grievances.
    pub fn is_management(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Editor | UserRole::Viewer)
    }
}

/// A registered identity in the global account registry, keyed by
/// lowercase-normalized email.
///
/// The credential is an opaque plaintext secret compared for equality at
/// login. That is a documented carried-over weakness of the system this
/// backend replaces; production deployments must substitute salted hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable account id, minted at registration. Grievances reference it
    /// through `reported_by`. Entries merged from older registry payloads
    /// may lack one; the email then stands in as the identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
    /// The single authoritative session token. Assigning a new one
    /// invalidates every previously issued token for this account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Open extension bag for registry fields the core never inspects.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Denormalized copy of an account taken at login time and embedded in the
/// session. Immutable snapshot; refreshed only by a new login or an explicit
/// profile update, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub session_id: String,
}

/// The singleton current-session record: "this account is currently logged
/// in here". Valid only while `user.session_id` matches the registry
/// account's `active_session_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
}

/// Verdict of a session validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Token matches the registry; the session may continue.
    Valid,
    /// A newer login overwrote the authoritative token.
    Preempted,
    /// The account vanished from the registry.
    NotFound,
}

/// Request body for logging in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registering a citizen account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Request body for checking a browser-held session copy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheckRequest {
    pub email: String,
    pub session_id: String,
}

/// Request body for updating the logged-in user's profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}
