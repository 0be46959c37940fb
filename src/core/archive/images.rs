//! Writes base64-encoded image responses of a capture to disk.

use super::har::HarArchive;
use crate::error::ArchiveError;
use crate::events::{Event, EventSender, ExtractEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension used when the MIME subtype yields nothing usable
const DEFAULT_EXTENSION: &str = "jpg";

/// Result of an image extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageExtraction {
    /// Files written, in archive order
    pub saved: Vec<PathBuf>,
    /// Image entries that could not be written
    pub skipped: usize,
    /// Image entries seen (including skipped ones)
    pub image_entries: usize,
}

/// File extension for an image MIME type.
///
/// `image/jpeg` gives `jpeg`, `image/svg+xml` gives `svgxml`, and any
/// `?param` suffix is dropped.
pub fn extension_for(mime_type: &str) -> String {
    let subtype = mime_type.rsplit('/').next().unwrap_or_default();
    let subtype = subtype.split('?').next().unwrap_or_default();
    let cleaned: String = subtype.chars().filter(char::is_ascii_alphanumeric).collect();

    if cleaned.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        cleaned
    }
}

/// Write every base64 image response in `archive` to `output_dir` as
/// `image_<n>.<ext>`.
///
/// `n` counts image entries in archive order, so skipped entries leave gaps
/// in the numbering. Individual failures are logged and skipped.
pub fn extract_images(
    archive: &HarArchive,
    output_dir: &Path,
    events: &EventSender,
) -> Result<ImageExtraction, ArchiveError> {
    fs::create_dir_all(output_dir).map_err(|e| ArchiveError::Write {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut extraction = ImageExtraction::default();

    for (index, entry) in archive.entries().iter().enumerate() {
        let Some(content) = entry.content() else {
            continue;
        };
        if !content.mime_type.starts_with("image/") || !content.is_base64() {
            continue;
        }

        extraction.image_entries += 1;
        let counter = extraction.image_entries;

        let bytes = match content.decoded_bytes() {
            Some(Ok(bytes)) if !bytes.is_empty() => bytes,
            Some(Ok(_)) | None => {
                extraction.skipped += 1;
                continue;
            }
            Some(Err(e)) => {
                warn!(entry = index, error = %e, "could not decode base64 image");
                events.send(Event::Extract(ExtractEvent::Skipped {
                    entry: index,
                    message: e.to_string(),
                }));
                extraction.skipped += 1;
                continue;
            }
        };

        let path = output_dir.join(format!(
            "image_{}.{}",
            counter,
            extension_for(&content.mime_type)
        ));

        match fs::write(&path, &bytes) {
            Ok(()) => {
                events.send(Event::Extract(ExtractEvent::ImageSaved { path: path.clone() }));
                extraction.saved.push(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not write image");
                events.send(Event::Extract(ExtractEvent::Skipped {
                    entry: index,
                    message: e.to_string(),
                }));
                extraction.skipped += 1;
            }
        }
    }

    info!(
        saved = extraction.saved.len(),
        skipped = extraction.skipped,
        dir = %output_dir.display(),
        "image extraction complete"
    );

    Ok(extraction)
}
