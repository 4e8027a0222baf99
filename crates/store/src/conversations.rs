//! The conversations file — durable snapshot of all topics.
//!
//! On-disk format: a top-level JSON array; each element
//! `{ "id": string, "title": string, "turns": [[user, assistant], ...] }`.
//! Insertion order is creation order and is preserved across reloads.

use confab_core::error::StoreError;
use confab_core::message::Conversation;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Load/save access to the conversations file.
///
/// Reads fail soft: a missing file, unreadable content, or a top-level
/// shape that is not an array of conversations all load as an empty
/// snapshot — stored history is never a reason to refuse startup.
/// Writes rewrite the whole file through a temp-file rename so a crash
/// mid-write cannot leave a half-serialized snapshot behind.
pub struct ConversationStore {
    path: PathBuf,
}

impl ConversationStore {
    /// Create a store over the given conversations file path.
    ///
    /// The file is not touched until the first `save`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the full snapshot from disk.
    ///
    /// Never fails: absent, corrupt, or wrong-shaped content returns an
    /// empty snapshot (logged, not surfaced).
    pub fn load(&self) -> Vec<Conversation> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => {
                debug!(path = %self.path.display(), "No conversations file yet, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Conversation>>(&content) {
            Ok(snapshot) => {
                debug!(
                    path = %self.path.display(),
                    count = snapshot.len(),
                    "Conversations loaded"
                );
                snapshot
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Conversations file unreadable, starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Serialize the full snapshot and overwrite durable storage.
    ///
    /// Deterministic: saving the same snapshot twice yields byte-identical
    /// content. The write goes to a `.tmp` sibling first and is renamed
    /// into place so readers never observe a partial file.
    pub fn save(&self, snapshot: &[Conversation]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let content =
            serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Serialize(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content).map_err(|e| StoreError::Write {
            path: tmp_path.clone(),
            reason: e.to_string(),
        })?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            path = %self.path.display(),
            count = snapshot.len(),
            bytes = content.len(),
            "Snapshot saved"
        );
        Ok(())
    }
}
