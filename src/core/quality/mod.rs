//! # Quality Module
//!
//! Scores an image file by pixel count, then by byte size.
//!
//! Scores are compared lexicographically: more pixels always wins, and byte
//! size only breaks ties between equal resolutions. By default only the image
//! header is read; [`DecodeDepth::Full`] decodes every pixel, which also
//! rejects files whose header is fine but whose body is damaged.

use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AssetError;

/// Quality of one asset. Field order defines the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualityScore {
    /// Width × height in pixels
    pub resolution: u64,
    /// File length in bytes
    pub byte_size: u64,
}

impl QualityScore {
    pub fn new(resolution: u64, byte_size: u64) -> Self {
        Self {
            resolution,
            byte_size,
        }
    }

    /// Strictly better than `other`
    pub fn beats(&self, other: &QualityScore) -> bool {
        self > other
    }
}

/// How much of the image to decode when measuring it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeDepth {
    /// Read dimensions from the header only
    #[default]
    Header,
    /// Decode all pixel data
    Full,
}

/// Measures image files
#[derive(Debug, Clone, Default)]
pub struct QualityEvaluator {
    depth: DecodeDepth,
}

impl QualityEvaluator {
    pub fn new(depth: DecodeDepth) -> Self {
        Self { depth }
    }

    /// Score the image at `path` without modifying it.
    pub fn evaluate(&self, path: &Path) -> Result<QualityScore, AssetError> {
        let byte_size = fs::metadata(path)
            .map_err(|e| AssetError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        let (width, height) = self.dimensions(path)?;

        Ok(QualityScore {
            resolution: u64::from(width) * u64::from(height),
            byte_size,
        })
    }

    fn dimensions(&self, path: &Path) -> Result<(u32, u32), AssetError> {
        let reader = ImageReader::open(path)
            .map_err(|e| AssetError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .with_guessed_format()
            .map_err(|e| AssetError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        if reader.format().is_none() {
            return Err(AssetError::Decode {
                path: path.to_path_buf(),
                reason: "unrecognized image format".to_string(),
            });
        }

        let decode_error = |e: image::ImageError| AssetError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        match self.depth {
            DecodeDepth::Header => reader.into_dimensions().map_err(decode_error),
            DecodeDepth::Full => {
                let image = reader.decode().map_err(decode_error)?;
                Ok((image.width(), image.height()))
            }
        }
    }
}

/// Score a file reading only its header
pub fn evaluate(path: &Path) -> Result<QualityScore, AssetError> {
    QualityEvaluator::default().evaluate(path)
}
