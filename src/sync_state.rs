//! Device identity and persisted sync state.
//!
//! Each installation carries a stable device id plus the timestamp of its
//! last acknowledged sync, kept together in one JSON file next to the notes.
//! The id is derived deterministically from installation-specific paths so
//! reinstalling over the same profile keeps the identity; when those paths
//! are unavailable a random identifier is generated instead. Either way the
//! persisted file wins: an id is read back before it is ever regenerated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::NoteResult;

/// File name of the persisted sync state, inside the notes root
pub const SYNC_INFO_FILE: &str = "syncInfo.json";

/// Persisted sync state of one installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// Stable identifier of this installation (32 hex characters)
    pub device_id: String,
    /// Epoch-milliseconds of the last sync acknowledged by the server, 0 if never synced
    pub last_synced_time: i64,
}

/// Trait for device-id derivation implementations.
///
/// The real derivation touches host-specific paths; tests substitute a
/// provider returning a fixed id.
pub trait DeviceIdProvider: Send + Sync {
    /// Derive a deterministic device id, or `None` if the host gives this
    /// implementation nothing stable to derive from.
    fn derive_device_id(&self) -> Option<String>;
}

/// Default provider hashing stable installation paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallationPaths;

impl DeviceIdProvider for InstallationPaths {
    fn derive_device_id(&self) -> Option<String> {
        #[cfg(feature = "desktop")]
        {
            let home = dirs::home_dir()?;
            let config = dirs::config_dir()?;
            let data = dirs::data_dir()?;

            let mut hasher = Sha256::new();
            hasher.update(home.to_string_lossy().as_bytes());
            hasher.update(config.to_string_lossy().as_bytes());
            hasher.update(data.to_string_lossy().as_bytes());
            let digest = hasher.finalize();

            // First 16 bytes as hex, matching the 32-character id format
            let mut id = String::with_capacity(32);
            for byte in &digest[..16] {
                id.push_str(&format!("{:02x}", byte));
            }
            Some(id)
        }
        #[cfg(not(feature = "desktop"))]
        {
            None
        }
    }
}

/// Store for the persisted [`SyncState`] of one installation.
#[derive(Debug, Clone)]
pub struct SyncStateStore<P: DeviceIdProvider = InstallationPaths> {
    path: PathBuf,
    provider: P,
}

impl SyncStateStore {
    /// Create a store persisting state inside the given root directory
    pub fn new(root: &Path) -> Self {
        Self::with_provider(root, InstallationPaths)
    }
}

impl<P: DeviceIdProvider> SyncStateStore<P> {
    /// Create a store with a custom device-id provider
    pub fn with_provider(root: &Path, provider: P) -> Self {
        Self {
            path: root.join(SYNC_INFO_FILE),
            provider,
        }
    }

    /// Read the persisted sync state, creating it on first use.
    ///
    /// A corrupt state file is logged and regenerated, never fatal. The
    /// device id is only generated when no readable state exists, so it
    /// stays stable across runs.
    pub async fn get_sync_info(&self) -> NoteResult<SyncState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => return Ok(state),
                Err(e) => {
                    tracing::warn!("Corrupt sync state, regenerating: {}", e);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to read sync state, regenerating: {}", e);
            }
        }

        let state = SyncState {
            device_id: self.generate_device_id(),
            last_synced_time: 0,
        };
        self.save(&state).await?;
        Ok(state)
    }

    /// Persist a new last-synced timestamp, keeping the rest of the record.
    pub async fn update_sync_info(&self, last_synced_time: i64) -> NoteResult<()> {
        let mut state = self.get_sync_info().await?;
        state.last_synced_time = last_synced_time;
        self.save(&state).await
    }

    fn generate_device_id(&self) -> String {
        match self.provider.derive_device_id() {
            Some(id) => id,
            None => Uuid::now_v7().simple().to_string(),
        }
    }

    async fn save(&self, state: &SyncState) -> NoteResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}
