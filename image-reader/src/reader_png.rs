use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::ReaderError;

/// Keyword under which generation parameters are stored in PNG text chunks.
pub const PARAMETERS_KEYWORD: &str = "parameters";

/// Extract the raw `parameters` text from a PNG file, checking `tEXt`,
/// `iTXt`, and `zTXt` chunks in that order.
///
/// Text chunks are allowed to trail the image data, so when the header-side
/// chunks do not carry the field the decoder is driven to the end of the
/// stream and the info block is checked again.
pub fn read_parameters_text(path: &Path) -> Result<Option<String>, ReaderError> {
    let file = File::open(path).map_err(|source| ReaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder.read_info().map_err(|error| decode_error(path, error))?;

    if let Some(text) = parameters_from_info(reader.info()) {
        return Ok(Some(text));
    }

    reader.finish().map_err(|error| decode_error(path, error))?;
    Ok(parameters_from_info(reader.info()))
}

/// Scan the decoded chunk lists for the parameters keyword. A chunk whose
/// payload fails to decompress is treated as absent, matching the contract
/// that a broken field reads as no metadata.
fn parameters_from_info(info: &png::Info<'_>) -> Option<String> {
    for chunk in &info.uncompressed_latin1_text {
        if chunk.keyword == PARAMETERS_KEYWORD {
            return Some(chunk.text.clone());
        }
    }
    for chunk in &info.utf8_text {
        if chunk.keyword == PARAMETERS_KEYWORD {
            if let Ok(text) = chunk.get_text() {
                return Some(text);
            }
        }
    }
    for chunk in &info.compressed_latin1_text {
        if chunk.keyword == PARAMETERS_KEYWORD {
            if let Ok(text) = chunk.get_text() {
                return Some(text);
            }
        }
    }
    None
}

fn decode_error(path: &Path, error: png::DecodingError) -> ReaderError {
    ReaderError::Decode {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
