//! Data models for NoteMark.
//!
//! This module defines the core entities: NoteInfo and FullNote.
//! All timestamps are integer epoch-milliseconds, and all records serialize
//! with camelCase keys to match the on-disk sidecar and wire formats.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Metadata for a note, without its content.
///
/// Notes are identified by `title` (the filename minus the `.md` extension,
/// unique within the notes root). This same record is what the sidecar
/// metadata file stores and what the sync protocol exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    /// Unique note title (filename stem)
    pub title: String,
    /// When the content was last written (epoch millis)
    pub last_edit_time: i64,
    /// When the note was created (epoch millis)
    pub created_at_time: i64,
}

impl NoteInfo {
    /// Create a NoteInfo with both timestamps set to now
    pub fn new_now(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            title: title.into(),
            last_edit_time: now,
            created_at_time: now,
        }
    }
}

/// A complete note: metadata plus content.
///
/// Used when a note is opened, saved, or carried in a sync batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullNote {
    /// Unique note title (filename stem)
    pub title: String,
    /// The note text content
    pub content: String,
    /// When the content was last written (epoch millis)
    pub last_edit_time: i64,
    /// When the note was created (epoch millis)
    pub created_at_time: i64,
}

impl FullNote {
    /// Combine metadata and content into a full note
    pub fn from_info(info: NoteInfo, content: String) -> Self {
        Self {
            title: info.title,
            content,
            last_edit_time: info.last_edit_time,
            created_at_time: info.created_at_time,
        }
    }

    /// The metadata view of this note
    pub fn info(&self) -> NoteInfo {
        NoteInfo {
            title: self.title.clone(),
            last_edit_time: self.last_edit_time,
            created_at_time: self.created_at_time,
        }
    }
}

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_info_new_now() {
        let before = now_millis();
        let info = NoteInfo::new_now("Test");
        let after = now_millis();

        assert_eq!(info.title, "Test");
        assert_eq!(info.last_edit_time, info.created_at_time);
        assert!(info.created_at_time >= before && info.created_at_time <= after);
    }

    #[test]
    fn test_full_note_round_trip() {
        let info = NoteInfo {
            title: "Shopping".to_string(),
            last_edit_time: 200,
            created_at_time: 100,
        };
        let note = FullNote::from_info(info.clone(), "milk\neggs".to_string());

        assert_eq!(note.info(), info);
        assert_eq!(note.content, "milk\neggs");
    }

    #[test]
    fn test_camel_case_keys() {
        let info = NoteInfo {
            title: "Keys".to_string(),
            last_edit_time: 2,
            created_at_time: 1,
        };

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"lastEditTime\":2"));
        assert!(json.contains("\"createdAtTime\":1"));
        assert!(!json.contains("last_edit_time"));

        let parsed: NoteInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, info);
    }
}
