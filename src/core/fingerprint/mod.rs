//! # Fingerprint Module
//!
//! Content identity for asset files.
//!
//! A [`Fingerprint`] is the SHA-256 digest of a file's full byte content.
//! Files are streamed in fixed-size chunks so memory stays bounded no matter
//! how large the file is.
//!
//! ## Example
//! ```rust,ignore
//! use capture_assets::core::fingerprint::Fingerprinter;
//!
//! let fingerprint = Fingerprinter::default().fingerprint(&path)?;
//! println!("{}", fingerprint);
//! ```

use crate::error::AssetError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read chunk (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 digest of a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Fingerprint of an in-memory buffer
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_digest(&Sha256::digest(bytes))
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(digest);
        Self(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Streams files through SHA-256
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    chunk_size: usize,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Fingerprinter {
    /// Create a fingerprinter reading `chunk_size` bytes at a time.
    ///
    /// A chunk size of zero is bumped to one byte.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Fingerprint the file at `path`.
    ///
    /// The file must yield exactly as many bytes as its metadata reported
    /// when it was opened; anything else is [`AssetError::Truncated`].
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, AssetError> {
        let io_error = |source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let expected = file.metadata().map_err(io_error)?.len();

        self.fingerprint_reader(file, expected, path)
    }

    /// Hash everything `reader` yields, which must be exactly `expected_len`
    /// bytes. `path` only labels errors.
    pub fn fingerprint_reader<R: Read>(
        &self,
        mut reader: R,
        expected_len: u64,
        path: &Path,
    ) -> Result<Fingerprint, AssetError> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut read_total: u64 = 0;

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(AssetError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            };
            hasher.update(&buffer[..bytes_read]);
            read_total += bytes_read as u64;
        }

        if read_total != expected_len {
            return Err(AssetError::Truncated {
                path: path.to_path_buf(),
                expected: expected_len,
                read: read_total,
            });
        }

        Ok(Fingerprint::from_digest(&hasher.finalize()))
    }
}

/// Fingerprint a file with the default chunk size
pub fn fingerprint(path: &Path) -> Result<Fingerprint, AssetError> {
    Fingerprinter::default().fingerprint(path)
}
