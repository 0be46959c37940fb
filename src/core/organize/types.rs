//! Types for the organize module.

use crate::core::fingerprint::{Fingerprint, DEFAULT_CHUNK_SIZE};
use crate::core::quality::{DecodeDepth, QualityScore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeConfig {
    /// How much of each image to decode when scoring it
    pub decode_depth: DecodeDepth,
    /// Read chunk for fingerprinting
    pub chunk_size: usize,
    /// Read files on the rayon pool
    pub parallel: bool,
    /// Compute the plan without touching the directory
    pub dry_run: bool,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            decode_depth: DecodeDepth::Header,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
            dry_run: false,
        }
    }
}

/// A file that was fingerprinted and scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedAsset {
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
    pub score: QualityScore,
}

/// A file left out of grouping, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Assets sharing one fingerprint.
///
/// Always holds at least one member; `winner` indexes the best of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetGroup {
    fingerprint: Fingerprint,
    members: Vec<ScannedAsset>,
    winner: usize,
}

impl AssetGroup {
    /// Start a group from its first-seen member
    pub fn new(first: ScannedAsset) -> Self {
        Self {
            fingerprint: first.fingerprint,
            members: vec![first],
            winner: 0,
        }
    }

    /// Add a member. It only takes over as winner if it is strictly better,
    /// so among equal scores the earliest member stays.
    pub fn push(&mut self, asset: ScannedAsset) {
        debug_assert_eq!(asset.fingerprint, self.fingerprint);
        if asset.score.beats(&self.members[self.winner].score) {
            self.winner = self.members.len();
        }
        self.members.push(asset);
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Members in enumeration order
    pub fn members(&self) -> &[ScannedAsset] {
        &self.members
    }

    pub fn winner(&self) -> &ScannedAsset {
        &self.members[self.winner]
    }

    /// Members that lose to the winner
    pub fn duplicates(&self) -> impl Iterator<Item = &ScannedAsset> {
        let winner = self.winner;
        self.members
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != winner)
            .map(|(_, asset)| asset)
    }
}

/// What an organize run intends to do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizePlan {
    /// Directory being organized
    pub target: PathBuf,
    /// Groups in first-seen order
    pub groups: Vec<AssetGroup>,
    /// Files left out with a warning
    pub skipped: Vec<SkippedFile>,
    /// Entries that will not survive: losing duplicates, skipped files,
    /// subdirectories and symlinks
    pub removals: Vec<PathBuf>,
    /// Number of regular files considered
    pub total_files: usize,
}

impl OrganizePlan {
    /// Winners in group order
    pub fn winners(&self) -> impl Iterator<Item = &ScannedAsset> {
        self.groups.iter().map(AssetGroup::winner)
    }

    pub fn unique_count(&self) -> usize {
        self.groups.len()
    }
}

/// Result of an organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeReport {
    pub target: PathBuf,
    /// Regular files considered
    pub total_files: usize,
    /// Distinct assets retained
    pub unique_count: usize,
    /// Final paths of the retained assets
    pub kept: Vec<PathBuf>,
    /// Entries removed (or that would be removed on a dry run)
    pub removed: Vec<PathBuf>,
    /// Files skipped with a warning
    pub skipped: Vec<SkippedFile>,
    /// Files restored from an interrupted earlier run
    pub recovered: usize,
    pub duration_ms: u64,
    pub dry_run: bool,
}
