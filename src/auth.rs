//! User session and credential storage.
//!
//! Sync needs to know who the user is and whether they hold a token. The
//! [`SessionProvider`] trait abstracts where that answer comes from; the
//! file-backed [`CredentialsStore`] is the default implementation, keeping a
//! small JSON record next to the notes. The record is re-read on every call
//! so an external login flow can update it without restarting the app.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NoteResult;

/// File name of the persisted credentials record, inside the notes root
pub const USER_CREDENTIALS_FILE: &str = "userCredentials.json";

/// Identity and token of the current user.
///
/// The default value is the logged-out state: empty username, empty token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub username: String,
    pub token: String,
    pub is_logged_in: bool,
}

impl UserCredentials {
    /// Whether these credentials can authenticate a sync request
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Trait for session lookup implementations.
///
/// The sync engine asks for the current session at the start of every run;
/// implementations may read a file, a keychain, or return a fixture.
pub trait SessionProvider: Send + Sync {
    /// Resolve the current user credentials.
    ///
    /// A logged-out user is not an error: implementations return the default
    /// credentials in that case and let the caller decide how to react.
    fn current_session(&self) -> impl std::future::Future<Output = NoteResult<UserCredentials>> + Send;
}

/// File-backed credential storage under the notes root directory.
///
/// Missing or unreadable records recover to the logged-out default; a broken
/// credentials file should never take the store down with it.
#[derive(Debug, Clone)]
pub struct CredentialsStore {
    path: PathBuf,
}

impl CredentialsStore {
    /// Create a store persisting credentials inside the given root directory
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(USER_CREDENTIALS_FILE),
        }
    }

    /// Read the persisted credentials, falling back to the logged-out default.
    pub async fn load(&self) -> UserCredentials {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return UserCredentials::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read user credentials: {}", e);
                return UserCredentials::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!("Corrupt user credentials, treating as logged out: {}", e);
                UserCredentials::default()
            }
        }
    }

    /// Persist credentials after a successful login
    pub async fn save(&self, credentials: &UserCredentials) -> NoteResult<()> {
        let content = serde_json::to_string_pretty(credentials)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Reset the persisted record to the logged-out default
    pub async fn clear(&self) -> NoteResult<()> {
        self.save(&UserCredentials::default()).await
    }
}

impl SessionProvider for CredentialsStore {
    async fn current_session(&self) -> NoteResult<UserCredentials> {
        Ok(self.load().await)
    }
}
