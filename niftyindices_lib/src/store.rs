//! Per-index JSON files.
//!
//! Each run replaces an index's file with the freshly fetched response, then
//! reports how the record count moved relative to what was on disk before.

use std::path::PathBuf;

use niftyindices_api::{HistoryResponse, IndexHistory};
use serde::Serialize;

use crate::error::StoreError;

/// Record-count change for one index between the stored file and a new fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub index_name: String,
    pub old_count: usize,
    pub new_count: usize,
    pub delta: i64,
}

impl ChangeRecord {
    pub fn new(index_name: impl Into<String>, old_count: usize, new_count: usize) -> Self {
        Self {
            index_name: index_name.into(),
            old_count,
            new_count,
            delta: new_count as i64 - old_count as i64,
        }
    }

    /// Short human label for the change: `same`, `+N` or `-N`.
    pub fn label(&self) -> String {
        match self.delta {
            0 => "same".to_string(),
            d if d > 0 => format!("+{}", d),
            d => d.to_string(),
        }
    }
}

/// Replaces every path separator in an index name so it can be used as a
/// file name. Spaces and other characters are kept.
pub fn sanitize_file_name(index_name: &str, separator: char) -> String {
    index_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { separator } else { c })
        .collect()
}

/// Directory of `<index name>.json` files.
#[derive(Clone, Debug)]
pub struct Store {
    dir: PathBuf,
    separator: char,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>, separator: char) -> Self {
        Self {
            dir: dir.into(),
            separator,
        }
    }

    /// File an index's history is written to.
    pub fn path_for(&self, index_name: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.json",
            sanitize_file_name(index_name, self.separator)
        ))
    }

    /// Records in the stored file; zero when the file is missing or
    /// cannot be read or parsed.
    pub fn stored_count(&self, index_name: &str) -> usize {
        let path = self.path_for(index_name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return 0,
        };
        match serde_json::from_str::<HistoryResponse>(&content) {
            Ok(stored) => stored.record_count(),
            Err(e) => {
                tracing::warn!(
                    "  Ignoring unreadable previous file {}: {}",
                    path.display(),
                    e
                );
                0
            }
        }
    }

    /// Overwrites the index's file with the raw payload and returns the
    /// change against the previous file.
    pub fn save(
        &self,
        index_name: &str,
        history: &IndexHistory,
    ) -> Result<ChangeRecord, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let old_count = self.stored_count(index_name);
        let path = self.path_for(index_name);
        std::fs::write(&path, history.raw_payload.as_bytes()).map_err(|source| {
            StoreError::Write {
                path: path.clone(),
                source,
            }
        })?;

        let record = ChangeRecord::new(index_name, old_count, history.record_count);
        tracing::info!(
            "  Data count: {} -> {} ({})",
            record.old_count,
            record.new_count,
            record.label()
        );
        tracing::info!("  Saved to {}", path.display());
        Ok(record)
    }
}
