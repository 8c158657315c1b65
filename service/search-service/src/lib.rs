//! Folder search over PNG metadata, plus the file actions a viewer offers.
//!
//! A search is a single pass over one directory: no state survives between
//! calls, and the result is a function of the folder, the query, and the
//! filesystem at that moment.

use std::fs;
use std::path::{Path, PathBuf};

use image_model::{FileAction, ImageRecord, SearchMode, SearchQuery, SkipReason, SkippedFile};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("keyword list is empty")]
    EmptyKeywords,
}

/// Everything one search pass produced: the matches, in file-name order,
/// and a per-file account of what was left out and why. Readable files
/// whose metadata simply did not satisfy the query appear in neither list.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub matches: Vec<ImageRecord>,
    pub skipped: Vec<SkippedFile>,
    /// Total directory entries the pass looked at.
    pub scanned: usize,
}

/// Scan `folder` (non-recursive) and return every PNG whose metadata
/// satisfies `query`.
///
/// Entries are visited in file-name order so repeated searches over an
/// unchanged folder return identical results. Per-file problems never
/// abort the pass: the file lands in `skipped` with its reason and the
/// error is logged.
pub fn search(folder: &Path, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
    if query.keywords.is_empty() {
        return Err(SearchError::EmptyKeywords);
    }
    if !folder.is_dir() {
        return Err(SearchError::NotADirectory {
            path: folder.to_path_buf(),
        });
    }

    let entries = fs::read_dir(folder).map_err(|source| SearchError::ReadDir {
        path: folder.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SearchError::ReadDir {
            path: folder.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));

    let mut outcome = SearchOutcome {
        scanned: paths.len(),
        ..SearchOutcome::default()
    };
    for path in paths {
        if !image_reader::is_png_path(&path) {
            outcome
                .skipped
                .push(SkippedFile::new(path, SkipReason::UnsupportedExtension));
            continue;
        }
        let metadata = match image_reader::read_parameters(&path) {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                outcome
                    .skipped
                    .push(SkippedFile::new(path, SkipReason::EmptyMetadata));
                continue;
            }
            Err(error) => {
                tracing::warn!("skipping {}: {error}", path.display());
                outcome
                    .skipped
                    .push(SkippedFile::new(path, SkipReason::ReadFailed(error.to_string())));
                continue;
            }
        };
        if matches_query(&metadata, query) {
            let mut record = ImageRecord::new(&path, metadata);
            image_reader::enrich_image_record(&mut record, &path);
            outcome.matches.push(record);
        }
    }
    Ok(outcome)
}

/// Substring predicate over already-lowercased metadata.
fn matches_query(metadata: &str, query: &SearchQuery) -> bool {
    match query.mode {
        SearchMode::And => query
            .keywords
            .iter()
            .all(|keyword| metadata.contains(keyword.as_str())),
        SearchMode::Or => query
            .keywords
            .iter()
            .any(|keyword| metadata.contains(keyword.as_str())),
    }
}

// ------------------------------
// File actions
// ------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("source file does not exist: {}", path.display())]
    MissingSource { path: PathBuf },
    #[error("destination is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },
    #[error("{operation} failed for {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a successfully applied action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Copied { dest: PathBuf },
    Moved { dest: PathBuf },
    Opened,
}

/// Apply one explicit file action built by the presentation layer.
///
/// Copy and move keep the source file name and land inside `dest_dir`,
/// which must already exist. Move prefers a rename and falls back to
/// copy-then-remove when the rename fails (cross-device destination).
pub fn apply_file_action(action: &FileAction) -> Result<ActionOutcome, ActionError> {
    match action {
        FileAction::Copy { source, dest_dir } => {
            let dest = action_dest(source, dest_dir)?;
            fs::copy(source, &dest).map_err(|error| ActionError::Io {
                operation: "copy",
                path: dest.clone(),
                source: error,
            })?;
            Ok(ActionOutcome::Copied { dest })
        }
        FileAction::Move { source, dest_dir } => {
            let dest = action_dest(source, dest_dir)?;
            if fs::rename(source, &dest).is_err() {
                fs::copy(source, &dest).map_err(|error| ActionError::Io {
                    operation: "move",
                    path: dest.clone(),
                    source: error,
                })?;
                fs::remove_file(source).map_err(|error| ActionError::Io {
                    operation: "move",
                    path: source.clone(),
                    source: error,
                })?;
            }
            Ok(ActionOutcome::Moved { dest })
        }
        FileAction::OpenExternal { path } => {
            if !path.exists() {
                return Err(ActionError::MissingSource { path: path.clone() });
            }
            open::that(path).map_err(|error| ActionError::Io {
                operation: "open",
                path: path.clone(),
                source: error,
            })?;
            Ok(ActionOutcome::Opened)
        }
    }
}

fn action_dest(source: &Path, dest_dir: &Path) -> Result<PathBuf, ActionError> {
    if !source.is_file() {
        return Err(ActionError::MissingSource {
            path: source.to_path_buf(),
        });
    }
    if !dest_dir.is_dir() {
        return Err(ActionError::NotADirectory {
            path: dest_dir.to_path_buf(),
        });
    }
    let name = source.file_name().ok_or_else(|| ActionError::MissingSource {
        path: source.to_path_buf(),
    })?;
    Ok(dest_dir.join(name))
}
