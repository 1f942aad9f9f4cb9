//! Cloud sync engine for NoteMark.
//!
//! This module provides the client side of the cloud sync protocol,
//! allowing this device to:
//! - Send the full local note set in one batched, bearer-authenticated request
//! - Apply the authoritative merged set the server returns
//! - Remove notes the server no longer knows about
//! - Track the last acknowledged sync time per installation
//!
//! A sync run is a single pass: collect, authenticate, send, reconcile.
//! There is no background scheduler and no retry; the caller (typically a
//! sync button) decides when to run again. The server is the arbiter of the
//! merged outcome — the engine never merges content itself, it only skips
//! writes for notes whose local copy is already current.

use std::collections::{HashMap, HashSet};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::auth::SessionProvider;
use crate::error::{NoteError, NoteResult};
use crate::models::FullNote;
use crate::store::NoteStore;
use crate::sync_state::SyncStateStore;

/// Result of a completed sync run.
///
/// `errors` collects best-effort failures (individual reconciliation
/// deletions) that did not abort the run.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// Notes sent to the server
    pub sent: usize,
    /// Notes created locally from the server set
    pub created: usize,
    /// Notes overwritten locally with a newer server copy
    pub updated: usize,
    /// Notes deleted locally because the server no longer returned them
    pub deleted: usize,
    /// Non-fatal per-note failures
    pub errors: Vec<String>,
}

/// Sync request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest {
    username: String,
    device_id: String,
    notes: Vec<FullNote>,
}

/// Sync response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncResponse {
    #[serde(default)]
    last_synced_time: Option<i64>,
    notes: Vec<FullNote>,
}

/// Cloud sync engine over one note store.
pub struct SyncEngine {
    store: NoteStore,
    state: SyncStateStore,
    client: Client,
    endpoint: String,
}

impl SyncEngine {
    /// Create a sync engine targeting the given server base URL.
    pub fn new(store: NoteStore, endpoint: impl Into<String>) -> NoteResult<Self> {
        let state = SyncStateStore::new(store.root());
        let client = Client::builder()
            .build()
            .map_err(|e| NoteError::network(e.to_string()))?;

        Ok(Self {
            store,
            state,
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Synchronize all local notes with the cloud.
    ///
    /// Auth and network failures abort before any local file is touched.
    /// After a successful round trip the local directory is reconciled
    /// against the server's note set: newer server copies are written with
    /// their exact timestamps, titles the server omitted are deleted, and
    /// the acknowledged sync time is persisted.
    pub async fn sync_with_cloud(
        &self,
        sessions: &impl SessionProvider,
    ) -> NoteResult<SyncOutcome> {
        // Step 1: Collect every local note with fresh timestamps
        let local = self.collect_local_notes().await?;
        let local_index: HashMap<String, i64> = local
            .iter()
            .map(|note| (note.title.clone(), note.last_edit_time))
            .collect();

        // Step 2: Resolve the session and device identity
        let credentials = sessions.current_session().await?;
        if !credentials.has_token() {
            return Err(NoteError::auth("not logged in"));
        }
        let state = self.state.get_sync_info().await?;

        // Step 3: One batched round trip carrying the full local set
        tracing::info!("Syncing {} notes with the cloud", local.len());
        let request = SyncRequest {
            username: credentials.username,
            device_id: state.device_id,
            notes: local,
        };
        let response = self.send(&request, &credentials.token).await?;

        // Step 4: Reconcile the local directory against the server's set
        let mut outcome = self.reconcile(&local_index, response.notes).await?;
        outcome.sent = local_index.len();

        // Step 5: Persist the acknowledged sync time
        if let Some(last_synced_time) = response.last_synced_time {
            self.state.update_sync_info(last_synced_time).await?;
        }

        tracing::info!(
            "Sync complete: {} sent, {} created, {} updated, {} deleted",
            outcome.sent,
            outcome.created,
            outcome.updated,
            outcome.deleted
        );
        Ok(outcome)
    }

    // Internal methods

    /// Read every local note concurrently, joining before the send begins.
    async fn collect_local_notes(&self) -> NoteResult<Vec<FullNote>> {
        let infos = self.store.list_notes().await?;

        let mut reads = JoinSet::new();
        for info in infos {
            let store = self.store.clone();
            reads.spawn(async move {
                let content = store.read_note(&info.title).await?;
                Ok::<FullNote, NoteError>(FullNote::from_info(info, content))
            });
        }

        let mut notes = Vec::new();
        while let Some(joined) = reads.join_next().await {
            let note = joined.map_err(|e| NoteError::sync(format!("note read failed: {}", e)))??;
            notes.push(note);
        }
        Ok(notes)
    }

    async fn send(&self, request: &SyncRequest, token: &str) -> NoteResult<SyncResponse> {
        let response = self
            .client
            .post(format!("{}/notes", self.endpoint))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| NoteError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NoteError::network(format!(
                "sync failed with status {}",
                response.status()
            )));
        }

        response
            .json::<SyncResponse>()
            .await
            .map_err(|e| NoteError::sync(format!("failed to parse sync response: {}", e)))
    }

    /// Apply the server's authoritative note set to the local directory.
    ///
    /// `local_index` maps the titles that were sent to their last edit time.
    /// Server copies win only when strictly newer (or the title is absent
    /// locally); sent titles the server omitted are deleted concurrently,
    /// with individual failures logged and recorded rather than aborting.
    async fn reconcile(
        &self,
        local_index: &HashMap<String, i64>,
        server_notes: Vec<FullNote>,
    ) -> NoteResult<SyncOutcome> {
        let mut outcome = SyncOutcome::default();
        let server_titles: HashSet<String> =
            server_notes.iter().map(|note| note.title.clone()).collect();

        for note in server_notes {
            match local_index.get(&note.title) {
                // Local copy is current or newer, leave it untouched
                Some(&local_edit) if local_edit >= note.last_edit_time => {}
                existing => {
                    self.store
                        .write_note(
                            &note.title,
                            &note.content,
                            Some(note.last_edit_time),
                            Some(note.created_at_time),
                        )
                        .await?;
                    if existing.is_some() {
                        outcome.updated += 1;
                    } else {
                        outcome.created += 1;
                    }
                }
            }
        }

        // Titles the server no longer returns were deleted on another device
        let mut deletions = JoinSet::new();
        for title in local_index.keys() {
            if !server_titles.contains(title) {
                let store = self.store.clone();
                let title = title.clone();
                deletions.spawn(async move {
                    let result = store.remove_note(&title).await;
                    (title, result)
                });
            }
        }

        while let Some(joined) = deletions.join_next().await {
            match joined {
                Ok((title, Ok(()))) => {
                    tracing::info!("Deleted '{}' (absent from server)", title);
                    outcome.deleted += 1;
                }
                Ok((title, Err(e))) => {
                    tracing::warn!("Failed to delete '{}': {}", title, e);
                    outcome.errors.push(format!("delete {}: {}", title, e));
                }
                Err(e) => {
                    tracing::warn!("Deletion task failed: {}", e);
                    outcome.errors.push(format!("delete task: {}", e));
                }
            }
        }

        Ok(outcome)
    }
}
