//! Metadata extraction for PNG image files.
//!
//! The only field this crate understands is the `parameters` text chunk that
//! image generators embed alongside the pixels. Extraction stays at the
//! chunk level; pixel data is skipped, never expanded into memory.

pub mod reader_png;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image_model::ImageRecord;

pub use reader_png::{read_parameters_text, PARAMETERS_KEYWORD};

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
}

/// True when the file name ends in `.png`, any letter case.
///
/// This is a name check only; whether the bytes really are a PNG is decided
/// by the decoder when the file is read.
pub fn is_png_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(".png"))
        .unwrap_or(false)
}

/// Read the `parameters` field of a PNG, lowercased for matching.
///
/// `Ok(None)` means the file decoded fine but carries no such field.
pub fn read_parameters(path: &Path) -> Result<Option<String>, ReaderError> {
    Ok(read_parameters_text(path)?.map(|text| text.to_lowercase()))
}

/// Total-function form of [`read_parameters`]: absent field, unreadable
/// file, and undecodable image all come back as an empty string, with the
/// error logged instead of propagated. A file that cannot be read simply
/// never matches a keyword.
pub fn read_metadata(path: &Path) -> String {
    match read_parameters(path) {
        Ok(Some(text)) => text,
        Ok(None) => String::new(),
        Err(error) => {
            tracing::warn!("failed to read metadata from {}: {error}", path.display());
            String::new()
        }
    }
}

/// Build a full record for one image: extracted metadata plus the cheap
/// filesystem enrichment shown in detail views.
pub fn build_image_record(path: &Path) -> Result<ImageRecord, ReaderError> {
    let metadata = read_parameters(path)?.unwrap_or_default();
    let mut record = ImageRecord::new(path, metadata);
    enrich_image_record(&mut record, path);
    Ok(record)
}

/// File size and modified time from filesystem metadata; left at their
/// defaults when the filesystem does not report them.
pub fn enrich_image_record(record: &mut ImageRecord, path: &Path) {
    if let Ok(md) = std::fs::metadata(path) {
        record.size_bytes = md.len();
        if let Ok(modified) = md.modified() {
            record.modified_at = Some(DateTime::<Utc>::from(modified));
        }
    }
}
