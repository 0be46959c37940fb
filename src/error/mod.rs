//! # Error Module
//!
//! Error types for capture extraction and asset organization.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file errors are recoverable** - an [`AssetError`] skips one file,
//!   an [`OrganizeError`] stops the whole run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Organize error: {0}")]
    Organize(#[from] OrganizeError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Errors reading a single asset file.
///
/// These never abort an organize run; the file is skipped and reported.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {path} ended after {read} of {expected} bytes")]
    Truncated {
        path: PathBuf,
        expected: u64,
        read: u64,
    },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

impl AssetError {
    /// Path of the file this error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            AssetError::Io { path, .. }
            | AssetError::Truncated { path, .. }
            | AssetError::Decode { path, .. } => path,
        }
    }
}

/// Fatal errors of an organize run
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to list {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage {path}: {source}. The target directory was not modified.")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}. Staged assets are kept in {staging} and will be restored on the next run.")]
    Purge {
        path: PathBuf,
        staging: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {path} into place: {source}. Staged assets are kept in {staging} and will be restored on the next run.")]
    Promote {
        path: PathBuf,
        staging: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to recover interrupted staging area {path}: {source}")]
    Recover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading a HAR capture or writing what was extracted from it
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("HAR file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read HAR file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse HAR JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CaptureError>;
