//! # Core Module
//!
//! The extraction and deduplication engine, independent of any front end.
//!
//! ## Modules
//! - `archive` - Reads HAR captures, extracts images and message text
//! - `fingerprint` - Content identity (SHA-256) of asset files
//! - `quality` - Resolution and size scoring of images
//! - `organize` - Keeps the best copy of each distinct asset in a directory

pub mod archive;
pub mod fingerprint;
pub mod organize;
pub mod quality;

// Re-export commonly used types
pub use fingerprint::Fingerprint;
pub use organize::{OrganizeReport, Organizer};
pub use quality::QualityScore;
