//! The flat log — append-only JSONL of individual turn pairs.
//!
//! One `{"instruction": ..., "output": ...}` object per line, no header,
//! no trailing structure — safe to tail. There is no read path: records
//! are written for downstream reuse (e.g., future fine-tuning) and
//! nothing in the chat flow ever depends on them.

use confab_core::error::StoreError;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Serialize)]
struct FlatRecord<'a> {
    instruction: &'a str,
    output: &'a str,
}

/// Append-only writer for the flat training log.
pub struct FlatLog {
    path: PathBuf,
}

impl FlatLog {
    /// Create a flat log over the given JSONL file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path this log appends to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Append one (instruction, output) record.
    ///
    /// A no-op when either side is empty — half a pair is useless as
    /// training data. Prior content is never rewritten.
    pub fn append(&self, user_text: &str, assistant_text: &str) -> Result<(), StoreError> {
        if user_text.is_empty() || assistant_text.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let record = FlatRecord {
            instruction: user_text,
            output: assistant_text,
        };
        let line =
            serde_json::to_string(&record).map_err(|e| StoreError::Serialize(e.to_string()))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::Write {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        writeln!(file, "{line}").map_err(|e| StoreError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %self.path.display(), "Flat record appended");
        Ok(())
    }
}
