//! NoteMarkCore - Rust implementation of the NoteMark note-taking application core.
//!
//! This library provides the core functionality for NoteMark:
//! - Data models (NoteInfo, FullNote)
//! - File-backed note store with JSON metadata sidecars
//! - Cloud sync engine (batched upload, server-authoritative reconciliation)
//! - Device identity and persisted sync state
//! - User session storage
//!
//! This is a pure Rust library designed to be embedded in a desktop shell
//! (which supplies the native dialogs and the UI) and reused by other hosts.
//!
//! # Feature Flags
//!
//! - `desktop`: Include desktop-specific features (home/config dir detection
//!   for the default notes root and the derived device id).

pub mod auth;
pub mod dialogs;
pub mod error;
pub mod metadata;
pub mod models;
pub mod store;
pub mod sync;
pub mod sync_state;

// Re-export commonly used types
pub use auth::{CredentialsStore, SessionProvider, UserCredentials};
pub use dialogs::DialogService;
pub use error::{NoteError, NoteResult};
pub use models::{FullNote, NoteInfo};
pub use store::NoteStore;
pub use sync::{SyncEngine, SyncOutcome};
pub use sync_state::{SyncState, SyncStateStore};
