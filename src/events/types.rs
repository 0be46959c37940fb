//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while organizing or extracting assets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Read phase events (fingerprint + quality)
    Scan(ScanEvent),
    /// Staging and replace events
    Replace(ReplaceEvent),
    /// HAR extraction events
    Extract(ExtractEvent),
    /// Organizer-level events
    Organize(OrganizeEvent),
}

/// Events during the read phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration finished, reading is about to start
    Started { total_files: usize },
    /// Progress update after each file
    Progress(ScanProgress),
    /// A file could not be fingerprinted or evaluated
    Skipped { path: PathBuf, message: String },
    /// All files have been read
    Completed { scored: usize, skipped: usize },
}

/// Progress information during the read phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of files read so far
    pub completed: usize,
    /// Total number of files to read
    pub total: usize,
    /// File that was just read
    pub current_path: PathBuf,
}

/// Events during the staged replace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReplaceEvent {
    /// Files left by an interrupted run were moved back
    Recovered { staging: PathBuf, restored: usize },
    /// A winner was copied into the staging area
    Staged { path: PathBuf },
    /// An old entry was removed from the target directory
    Purged { path: PathBuf },
    /// A staged winner was moved into the target directory
    Promoted { path: PathBuf },
}

/// Events while extracting from a HAR capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    /// An image payload was written to disk
    ImageSaved { path: PathBuf },
    /// An entry could not be extracted
    Skipped { entry: usize, message: String },
    /// Message extraction finished
    MessagesFound { count: usize },
}

/// Organizer-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// Organizing has started
    Started { target: PathBuf },
    /// Moving to a new phase
    PhaseChanged { phase: OrganizePhase },
    /// Organizing completed successfully
    Completed { summary: OrganizeSummary },
    /// Organizing stopped on a fatal error
    Error { message: String },
}

/// Phases of an organize run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganizePhase {
    Recovering,
    Scanning,
    Grouping,
    Staging,
    Replacing,
}

/// Summary of an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeSummary {
    /// Files considered
    pub total_files: usize,
    /// Distinct assets kept
    pub unique_count: usize,
    /// Entries removed from the target directory
    pub removed_count: usize,
    /// Files skipped with a warning
    pub skipped_count: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for OrganizePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganizePhase::Recovering => write!(f, "Recovering"),
            OrganizePhase::Scanning => write!(f, "Scanning"),
            OrganizePhase::Grouping => write!(f, "Grouping"),
            OrganizePhase::Staging => write!(f, "Staging"),
            OrganizePhase::Replacing => write!(f, "Replacing"),
        }
    }
}
