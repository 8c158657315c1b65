//! Shared models used across the image search crates.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One image considered during a search pass.
///
/// Built on demand while scanning a folder and discarded when the next
/// search replaces the results; never persisted by the crates here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path of the file, as joined from the scanned folder.
    pub path: PathBuf,
    /// File name component, kept separately for display.
    pub file_name: String,
    /// Extracted metadata text, lowercased at extraction time.
    pub metadata: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time, when the filesystem reports one.
    pub modified_at: Option<DateTime<Utc>>,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, metadata: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            metadata: metadata.into(),
            size_bytes: 0,
            modified_at: None,
        }
    }
}

/// Keyword combinator: every keyword must match, or at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    And,
    Or,
}

impl SearchMode {
    /// Stable text form used in config files and labels.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::And => "AND",
            SearchMode::Or => "OR",
        }
    }

    /// Parse the stable text form back, accepting any letter case.
    pub fn parse(text: &str) -> Option<SearchMode> {
        match text.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(SearchMode::And),
            "OR" => Some(SearchMode::Or),
            _ => None,
        }
    }
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::And
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed search request: normalized keywords plus a combinator mode.
///
/// Invariant: `keywords` is non-empty; construct via [`SearchQuery::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub mode: SearchMode,
}

impl SearchQuery {
    /// Split comma-separated input into lowercased, trimmed keywords.
    ///
    /// Returns `None` when no non-empty token survives, so a constructed
    /// query always carries at least one keyword.
    pub fn parse(raw: &str, mode: SearchMode) -> Option<SearchQuery> {
        let keywords = split_keywords(raw);
        if keywords.is_empty() {
            None
        } else {
            Some(SearchQuery { keywords, mode })
        }
    }
}

/// Keyword tokenization shared by the query type and its callers:
/// comma-split, trimmed, lowercased, empty tokens dropped.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Canonical raw form recorded in the history: the whole input trimmed
/// and lowercased, commas and spacing kept as typed.
pub fn normalize_query_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Why a directory entry was left out of a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry name does not end in `.png` (case-insensitive).
    UnsupportedExtension,
    /// The file decoded but carries no usable metadata text.
    EmptyMetadata,
    /// The file could not be opened or decoded.
    ReadFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedExtension => f.write_str("not a png file"),
            SkipReason::EmptyMetadata => f.write_str("no metadata"),
            SkipReason::ReadFailed(message) => write!(f, "read failed: {message}"),
        }
    }
}

/// Per-file accounting entry for files excluded from a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl SkippedFile {
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self { path: path.into(), reason }
    }
}

/// An explicit file operation requested from the viewer.
///
/// The presentation layer builds these; dispatch lives in the service crate
/// so the UI stays free of filesystem detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Copy `source` into `dest_dir`, keeping the file name.
    Copy { source: PathBuf, dest_dir: PathBuf },
    /// Move `source` into `dest_dir`, keeping the file name.
    Move { source: PathBuf, dest_dir: PathBuf },
    /// Open `path` with the platform's default viewer.
    OpenExternal { path: PathBuf },
}
