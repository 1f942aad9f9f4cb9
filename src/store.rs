//! File-backed note store.
//!
//! Notes are plain Markdown files in a single root directory, one file per
//! title. Timestamps come from two places: the filesystem stat and the JSON
//! sidecar records managed by [`crate::metadata`]. The store always stats
//! files fresh when reporting note info, so the picture callers see (and the
//! one sync sends) reflects the disk, not a cache.
//!
//! Create and delete go through the host shell's [`DialogService`]: a save
//! picker constrained to the root directory, and a confirmation prompt. A
//! dismissed dialog resolves the operation benignly (`None` / `false`).

use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::dialogs::DialogService;
use crate::error::{NoteError, NoteResult};
use crate::metadata::{resolve_note_times, FileTimes, MetadataStore};
use crate::models::{now_millis, NoteInfo};

/// Directory under the user's home that holds the notes by default
pub const NOTES_DIR_NAME: &str = "NoteMark";

/// File extension of note content files
pub const NOTE_FILE_SUFFIX: &str = ".md";

/// Title of the note seeded into an empty notes directory
pub const WELCOME_NOTE_TITLE: &str = "Welcome";

/// Default file name offered by the save dialog for a new note
pub const DEFAULT_NOTE_FILENAME: &str = "Untitled.md";

const WELCOME_NOTE_CONTENT: &str = include_str!("../resources/welcome.md");

/// Store for the notes of one root directory.
///
/// Cheap to clone; sync spawns tasks over clones of the store.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
    metadata: MetadataStore,
}

impl NoteStore {
    /// Create a store over the given root directory.
    ///
    /// On mobile platforms (without the `desktop` feature), `root` is required.
    pub fn new(root: Option<PathBuf>) -> NoteResult<Self> {
        let root = match root {
            Some(dir) => dir,
            None => {
                #[cfg(feature = "desktop")]
                {
                    dirs::home_dir()
                        .unwrap_or_else(|| PathBuf::from("."))
                        .join(NOTES_DIR_NAME)
                }
                #[cfg(not(feature = "desktop"))]
                {
                    return Err(NoteError::config(
                        "root directory is required on mobile platforms",
                    ));
                }
            }
        };

        let metadata = MetadataStore::new(&root);
        Ok(Self { root, metadata })
    }

    /// Root directory holding the note files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the content file for a title
    pub fn note_path(&self, title: &str) -> PathBuf {
        self.root.join(format!("{}{}", title, NOTE_FILE_SUFFIX))
    }

    async fn ensure_root(&self) -> NoteResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// List all notes with their authoritative timestamps.
    ///
    /// Creates the root directory if needed, and seeds a welcome note when
    /// the directory holds no notes at all. Timestamps are computed from a
    /// fresh stat of each file combined with its sidecar record.
    pub async fn list_notes(&self) -> NoteResult<Vec<NoteInfo>> {
        self.ensure_root().await?;

        let mut titles = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(title) = name.to_str().and_then(|n| n.strip_suffix(NOTE_FILE_SUFFIX)) {
                titles.push(title.to_string());
            }
        }

        if titles.is_empty() {
            tracing::info!("No notes found, creating a welcome note");
            tokio::fs::write(self.note_path(WELCOME_NOTE_TITLE), WELCOME_NOTE_CONTENT).await?;
            titles.push(WELCOME_NOTE_TITLE.to_string());
        }

        let mut notes = Vec::with_capacity(titles.len());
        for title in titles {
            notes.push(self.note_info(&title).await?);
        }

        Ok(notes)
    }

    /// Compute the authoritative `NoteInfo` for one title.
    pub async fn note_info(&self, title: &str) -> NoteResult<NoteInfo> {
        let meta = tokio::fs::metadata(self.note_path(title)).await?;
        let stat = FileTimes::from_metadata(&meta);
        let sidecar = self.metadata.read(title).await;

        let (created_at_time, last_edit_time) =
            resolve_note_times(sidecar.as_ref(), &stat, now_millis());

        Ok(NoteInfo {
            title: title.to_string(),
            last_edit_time,
            created_at_time,
        })
    }

    /// Read the content of a note.
    pub async fn read_note(&self, title: &str) -> NoteResult<String> {
        match tokio::fs::read_to_string(self.note_path(title)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(NoteError::NotFound(title.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a note, creating or overwriting its content file.
    ///
    /// When `created_at_time` is supplied the sidecar record is persisted
    /// with it. When `last_edit_time` is supplied the file's modification
    /// time is set to that exact value, so a remote timestamp can be
    /// reproduced precisely instead of becoming "now"; failure to set it is
    /// logged and does not fail the write.
    pub async fn write_note(
        &self,
        title: &str,
        content: &str,
        last_edit_time: Option<i64>,
        created_at_time: Option<i64>,
    ) -> NoteResult<()> {
        let path = self.note_path(title);

        tracing::info!("Writing note '{}'", title);
        tokio::fs::write(&path, content).await?;

        if let Some(created_at_time) = created_at_time {
            self.metadata
                .write(&NoteInfo {
                    title: title.to_string(),
                    last_edit_time: last_edit_time.unwrap_or(created_at_time),
                    created_at_time,
                })
                .await?;
        }

        if let Some(last_edit_time) = last_edit_time {
            let mtime = FileTime::from_unix_time(
                last_edit_time.div_euclid(1000),
                (last_edit_time.rem_euclid(1000) * 1_000_000) as u32,
            );
            if let Err(e) = filetime::set_file_times(&path, mtime, mtime) {
                tracing::warn!("Failed to preserve timestamp for '{}': {}", title, e);
            }
        }

        Ok(())
    }

    /// Create a new empty note at a user-chosen location.
    ///
    /// The save dialog is seeded with a default name; the chosen path must
    /// lie directly inside the root directory. Returns `Ok(None)` when the
    /// user cancels or picks a location outside the root (the latter also
    /// surfaces an error notice through the dialog service).
    pub async fn create_note(&self, dialogs: &impl DialogService) -> NoteResult<Option<String>> {
        self.ensure_root().await?;

        let Some(path) = dialogs.choose_save_path(DEFAULT_NOTE_FILENAME).await else {
            tracing::info!("Note creation cancelled");
            return Ok(None);
        };

        if path.parent() != Some(self.root.as_path()) {
            dialogs
                .notify_error(&format!(
                    "All notes must be saved inside {}. Notes saved in other folders cannot be loaded.",
                    self.root.display()
                ))
                .await;
            return Ok(None);
        }

        let Some(title) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            return Ok(None);
        };

        tracing::info!("Creating note '{}'", title);
        tokio::fs::write(&path, "").await?;
        self.metadata.write(&NoteInfo::new_now(title.clone())).await?;

        Ok(Some(title))
    }

    /// Delete a note after asking the user for confirmation.
    ///
    /// Returns `Ok(false)` when the user cancels.
    pub async fn delete_note(&self, title: &str, dialogs: &impl DialogService) -> NoteResult<bool> {
        let accepted = dialogs
            .confirm(&format!("Are you sure you want to delete {}?", title))
            .await;

        if !accepted {
            tracing::info!("Note deletion cancelled");
            return Ok(false);
        }

        tracing::info!("Deleting note '{}'", title);
        self.remove_note(title).await?;
        Ok(true)
    }

    /// Remove a note's content file and sidecar without user interaction.
    ///
    /// Shared by confirmed deletion and by sync reconciliation. A missing
    /// content file is not an error.
    pub async fn remove_note(&self, title: &str) -> NoteResult<()> {
        match tokio::fs::remove_file(self.note_path(title)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.metadata.remove(title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Dialog double answering from a fixed script.
    struct ScriptedDialogs {
        save_path: Option<PathBuf>,
        accept: bool,
        errors: Mutex<Vec<String>>,
    }

    impl ScriptedDialogs {
        fn saving_to(path: PathBuf) -> Self {
            Self {
                save_path: Some(path),
                accept: true,
                errors: Mutex::new(Vec::new()),
            }
        }

        fn cancelling() -> Self {
            Self {
                save_path: None,
                accept: false,
                errors: Mutex::new(Vec::new()),
            }
        }

        fn accepting() -> Self {
            Self {
                save_path: None,
                accept: true,
                errors: Mutex::new(Vec::new()),
            }
        }

        fn error_count(&self) -> usize {
            self.errors.lock().unwrap().len()
        }
    }

    impl DialogService for ScriptedDialogs {
        async fn choose_save_path(&self, _default_name: &str) -> Option<PathBuf> {
            self.save_path.clone()
        }

        async fn confirm(&self, _message: &str) -> bool {
            self.accept
        }

        async fn notify_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn store(temp_dir: &TempDir) -> NoteStore {
        NoteStore::new(Some(temp_dir.path().to_path_buf())).unwrap()
    }

    #[tokio::test]
    async fn test_list_seeds_welcome_note_when_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, WELCOME_NOTE_TITLE);
        assert!(store.note_path(WELCOME_NOTE_TITLE).exists());

        // A second listing sees the existing note and does not re-seed
        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
    }

    #[tokio::test]
    async fn test_list_skips_non_markdown_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.write_note("Ideas", "# Ideas", None, None).await.unwrap();
        tokio::fs::write(temp_dir.path().join("syncInfo.json"), "{}")
            .await
            .unwrap();
        tokio::fs::write(temp_dir.path().join("scratch.txt"), "x")
            .await
            .unwrap();

        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Ideas");
    }

    #[tokio::test]
    async fn test_explicit_timestamps_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .write_note("Pinned", "content", Some(1_600_000_000_000), Some(1_500_000_000_000))
            .await
            .unwrap();

        let info = store.note_info("Pinned").await.unwrap();
        assert_eq!(info.created_at_time, 1_500_000_000_000);
        assert_eq!(info.last_edit_time, 1_600_000_000_000);
    }

    #[tokio::test]
    async fn test_write_without_timestamps_leaves_no_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.write_note("Plain", "text", None, None).await.unwrap();

        let sidecar = MetadataStore::new(temp_dir.path()).read("Plain").await;
        assert!(sidecar.is_none());
        assert_eq!(store.read_note("Plain").await.unwrap(), "text");
    }

    #[tokio::test]
    async fn test_restored_mtime_feeds_last_edit_time() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .write_note("Old", "body", Some(1_400_000_000_000), None)
            .await
            .unwrap();

        let info = store.note_info("Old").await.unwrap();
        assert_eq!(info.last_edit_time, 1_400_000_000_000);
        assert!(info.created_at_time > 0);
    }

    #[tokio::test]
    async fn test_read_missing_note_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let err = store.read_note("Ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_note_writes_empty_file_and_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let dialogs = ScriptedDialogs::saving_to(temp_dir.path().join("Ideas.md"));

        let created = store.create_note(&dialogs).await.unwrap();
        assert_eq!(created.as_deref(), Some("Ideas"));
        assert_eq!(store.read_note("Ideas").await.unwrap(), "");

        let sidecar = MetadataStore::new(temp_dir.path())
            .read("Ideas")
            .await
            .unwrap();
        assert!(sidecar.created_at_time > 0);
        assert_eq!(sidecar.created_at_time, sidecar.last_edit_time);
    }

    #[tokio::test]
    async fn test_create_note_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let dialogs = ScriptedDialogs::cancelling();

        let created = store.create_note(&dialogs).await.unwrap();
        assert!(created.is_none());

        let mut entries = std::fs::read_dir(temp_dir.path()).unwrap();
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_create_note_outside_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let outside = elsewhere.path().join("Escape.md");
        let dialogs = ScriptedDialogs::saving_to(outside.clone());

        let created = store.create_note(&dialogs).await.unwrap();
        assert!(created.is_none());
        assert_eq!(dialogs.error_count(), 1);
        assert!(!outside.exists());
    }

    #[tokio::test]
    async fn test_delete_note_confirmed_removes_file_and_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store
            .write_note("Done", "x", Some(100), Some(100))
            .await
            .unwrap();

        let deleted = store.delete_note("Done", &ScriptedDialogs::accepting()).await.unwrap();
        assert!(deleted);
        assert!(!store.note_path("Done").exists());
        assert!(MetadataStore::new(temp_dir.path()).read("Done").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_note_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.write_note("Keep", "x", None, None).await.unwrap();

        let deleted = store.delete_note("Keep", &ScriptedDialogs::cancelling()).await.unwrap();
        assert!(!deleted);
        assert!(store.note_path("Keep").exists());
    }

    #[tokio::test]
    async fn test_remove_note_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.remove_note("Ghost").await.unwrap();
    }

    #[cfg(feature = "desktop")]
    #[test]
    fn test_default_root_under_home() {
        let store = NoteStore::new(None).unwrap();
        assert!(store.root().ends_with(NOTES_DIR_NAME));
    }
}
