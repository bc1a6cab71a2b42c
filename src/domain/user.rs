//! User account and role-change-request records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RequestStatus, RoleChangeRequestId, Speaker, UserId};

/// A user account as returned by the backend.
///
/// The user exclusively owns its balance and its role-change-request
/// history. The balance carries a non-negative invariant that the
/// payment coordinator enforces before any debit; the request history
/// is ordered oldest-to-newest by creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Opaque credential echo; never interpreted by the client core
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Balance in whole currency units
    #[serde(default)]
    pub balance: i64,
    /// Base role id; the effective role may differ once a role-change
    /// request is approved
    pub role_id: i64,
    #[serde(rename = "RoleChangeRequest", default)]
    pub role_change_requests: Vec<RoleChangeRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Speaker profiles linked to this account, if any
    #[serde(rename = "Speaker", default)]
    pub speaker_profiles: Vec<Speaker>,
}

/// A request to change a user's role, owned by that user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub id: RoleChangeRequestId,
    pub user_id: UserId,
    pub requested_role_id: i64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a user record. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

impl UserPatch {
    /// Patch that only updates the balance, used by the optimistic
    /// balance flush.
    pub fn balance(balance: i64) -> Self {
        Self {
            balance: Some(balance),
            ..Self::default()
        }
    }
}
