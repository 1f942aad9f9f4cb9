//! Metadata sidecars for notes.
//!
//! Each note may have one JSON sidecar record, keyed by title and stored in a
//! hidden subdirectory of the notes root. The sidecar carries the
//! authoritative creation time: filesystem birth times are unreliable on
//! several filesystems, so once a creation time has been recorded it is never
//! recomputed, only deleted together with its note.
//!
//! The precedence between the sidecar and filesystem stat data is a single
//! pure function, [`resolve_note_times`], so the fallback rules can be tested
//! without touching a real filesystem.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::NoteResult;
use crate::models::NoteInfo;

/// Name of the hidden directory holding sidecar records
pub const METADATA_DIR_NAME: &str = ".metadata";

/// Filesystem timestamps of a note content file, in epoch milliseconds.
///
/// `birth` is `None` when the filesystem does not report a creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    /// Modification time (always available)
    pub modified: i64,
    /// Birth/creation time, if the filesystem provides one
    pub birth: Option<i64>,
}

impl FileTimes {
    /// Extract timestamps from file metadata
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        Self {
            modified: meta
                .modified()
                .map(system_time_to_millis)
                .unwrap_or_default(),
            birth: meta.created().ok().map(system_time_to_millis),
        }
    }
}

fn system_time_to_millis(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Resolve the authoritative `(created_at_time, last_edit_time)` for a note.
///
/// The sidecar record, when present with a positive creation time, is the
/// sole source of truth for `created_at_time`; `last_edit_time` always comes
/// from the file's current modification time. Without a sidecar the birth
/// time is used, except when it is missing, equal to the modification time,
/// or in the future — all three signal a filesystem that does not preserve
/// creation times, and the modification time substitutes.
pub fn resolve_note_times(sidecar: Option<&NoteInfo>, stat: &FileTimes, now: i64) -> (i64, i64) {
    let last_edit_time = stat.modified;

    if let Some(record) = sidecar {
        if record.created_at_time > 0 {
            return (record.created_at_time, last_edit_time);
        }
    }

    let created_at_time = match stat.birth {
        Some(birth) if birth != stat.modified && birth <= now => birth,
        _ => stat.modified,
    };

    (created_at_time, last_edit_time)
}

/// Store for per-note sidecar records.
///
/// One JSON file per title under `<root>/.metadata/`. A record that cannot
/// be parsed is logged and treated as absent; the caller falls back to
/// filesystem stat data.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    /// Create a store rooted under the given notes directory
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(METADATA_DIR_NAME),
        }
    }

    /// Path of the sidecar file for a title
    pub fn record_path(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{}.json", title))
    }

    /// Read the sidecar record for a title, if one exists and parses.
    pub async fn read(&self, title: &str) -> Option<NoteInfo> {
        let path = self.record_path(title);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read sidecar for '{}': {}", title, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Corrupt sidecar for '{}', ignoring: {}", title, e);
                None
            }
        }
    }

    /// Write (create or replace) the sidecar record for a note
    pub async fn write(&self, record: &NoteInfo) -> NoteResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(record)?;
        tokio::fs::write(self.record_path(&record.title), content).await?;
        Ok(())
    }

    /// Remove the sidecar record for a title, if present
    pub async fn remove(&self, title: &str) -> NoteResult<()> {
        match tokio::fs::remove_file(self.record_path(title)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
