//! Durable session credentials
//!
//! Stands in for the browser's local storage: a small JSON document
//! holding the `user` and `token` keys, surviving process restarts so
//! a session can be restored without a network round trip.

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::User;

/// The persisted session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub user: User,
    pub token: String,
}

/// Durable key-value persistence for session credentials.
///
/// `store` and `clear` are best-effort: a persistence failure is
/// logged, never propagated — logout in particular must not fail.
#[cfg_attr(test, automock)]
pub trait CredentialCache: Send + Sync {
    fn load(&self) -> Option<StoredCredentials>;
    fn store(&self, credentials: &StoredCredentials);
    fn clear(&self);
}

/// Filesystem-backed credential cache.
pub struct FsCredentialCache {
    path: PathBuf,
}

impl FsCredentialCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialCache for FsCredentialCache {
    fn load(&self) -> Option<StoredCredentials> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "discarding unreadable credential file");
                None
            }
        }
    }

    fn store(&self, credentials: &StoredCredentials) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), %err, "could not create credential directory");
                return;
            }
        }
        match serde_json::to_vec_pretty(credentials) {
            Ok(bytes) => {
                if let Err(err) = fs::write(&self.path, bytes) {
                    warn!(path = %self.path.display(), %err, "could not persist credentials");
                }
            }
            Err(err) => warn!(%err, "could not encode credentials"),
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), %err, "could not clear credentials");
            }
        }
    }
}
