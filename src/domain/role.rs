//! Role table and effective-role resolution
//!
//! A user's effective role is their base role unless an administrator
//! has approved a role-change request, in which case the most recently
//! approved request wins. Resolution is pure: no network, no side
//! effects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClientError, Result};

use super::User;

/// The fixed role table.
///
/// Role ids 1..=5 map onto these variants; anything else is a hard
/// `InvalidRoleId` error rather than a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Speaker,
    Organizer,
    DbAdmin,
}

impl Role {
    /// Map a backend role id onto the role table.
    pub fn from_id(id: i64) -> Result<Self> {
        match id {
            1 => Ok(Role::User),
            2 => Ok(Role::Admin),
            3 => Ok(Role::Speaker),
            4 => Ok(Role::Organizer),
            5 => Ok(Role::DbAdmin),
            other => Err(ClientError::InvalidRoleId(other)),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Role::User => 1,
            Role::Admin => 2,
            Role::Speaker => 3,
            Role::Organizer => 4,
            Role::DbAdmin => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Speaker => "speaker",
            Role::Organizer => "organizer",
            Role::DbAdmin => "db_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolve the role actually governing a user's view.
///
/// The approved request with the latest `updated_at` wins; ties are
/// broken by the higher request id so resolution is deterministic.
/// With no approved requests the base role applies.
pub fn resolve_effective_role(user: &User) -> Result<Role> {
    let latest_approved = user
        .role_change_requests
        .iter()
        .filter(|req| req.status == super::RequestStatus::Approved)
        .max_by(|a, b| {
            a.updated_at
                .cmp(&b.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });

    match latest_approved {
        Some(req) => Role::from_id(req.requested_role_id),
        None => Role::from_id(user.role_id),
    }
}
