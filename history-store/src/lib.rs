//! Persistence for recent search queries.
//!
//! The history is one small JSON file: an array of raw query strings, most
//! recently used first, capped at [`HISTORY_CAP`] entries.

use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of query strings kept on disk.
pub const HISTORY_CAP: usize = 20;

/// File name used when no explicit history path is configured.
pub const DEFAULT_HISTORY_FILE_NAME: &str = "keyword_history.json";

/// Default history location: the working directory.
pub fn default_history_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DEFAULT_HISTORY_FILE_NAME)
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to write history {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handle to one on-disk history file.
///
/// Constructed with an explicit path and handed to whoever records queries;
/// no global state, no cross-call locking. Every save is a complete
/// read-modify-write cycle (single-user, single-process assumption).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved queries, most recent first.
    ///
    /// A missing file is an empty history. An unreadable or malformed file
    /// degrades to empty with a warning; loading never fails the caller.
    pub fn load(&self) -> Vec<String> {
        if !self.path.exists() {
            return Vec::new();
        }
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!("history file {} is unreadable: {error}", self.path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!("history file {} is malformed: {error}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Record one raw query string.
    ///
    /// If the string is already present the file is left untouched; it is
    /// not promoted to the front. Otherwise it is inserted at the front and
    /// entries beyond [`HISTORY_CAP`] are dropped. Returns the list as it
    /// stands after the call.
    pub fn save(&self, raw_query: &str) -> Result<Vec<String>, HistoryError> {
        let mut entries = self.load();
        if entries.iter().any(|entry| entry == raw_query) {
            return Ok(entries);
        }
        entries.insert(0, raw_query.to_string());
        entries.truncate(HISTORY_CAP);
        self.write(&entries)?;
        Ok(entries)
    }

    /// Pretty-printed UTF-8 JSON, written through a sibling temp file and
    /// renamed over the target so an interrupted save cannot leave a
    /// half-written list behind.
    fn write(&self, entries: &[String]) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| HistoryError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| HistoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
