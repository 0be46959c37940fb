//! Read phase: enumerate the target directory and score every file.

use super::executor::is_staging_dir;
use super::types::{ScannedAsset, SkippedFile};
use crate::core::fingerprint::Fingerprinter;
use crate::core::quality::QualityEvaluator;
use crate::error::{AssetError, OrganizeError};
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Snapshot of the entries directly inside a directory
#[derive(Debug, Default)]
pub struct Listing {
    /// Regular files and symlinks to regular files, sorted by file name
    pub files: Vec<PathBuf>,
    /// Subdirectories, dangling or directory symlinks and other non-files
    pub others: Vec<PathBuf>,
    /// Staging areas left by interrupted runs
    pub stale_staging: Vec<PathBuf>,
}

/// A symlink counts as a file when it resolves to one. Staging copies the
/// target's bytes, so the link is replaced by a real file.
fn links_to_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Output of the read phase
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Successfully scored files, in enumeration order
    pub assets: Vec<ScannedAsset>,
    pub skipped: Vec<SkippedFile>,
    pub others: Vec<PathBuf>,
    pub total_files: usize,
}

/// Fingerprints and scores the files of a flat asset directory
#[derive(Debug, Clone, Default)]
pub struct OrganizeScanner {
    fingerprinter: Fingerprinter,
    evaluator: QualityEvaluator,
    parallel: bool,
}

impl OrganizeScanner {
    pub fn new(fingerprinter: Fingerprinter, evaluator: QualityEvaluator, parallel: bool) -> Self {
        Self {
            fingerprinter,
            evaluator,
            parallel,
        }
    }

    /// List the entries directly inside `target`.
    ///
    /// Order is by file name so that ties resolve the same way on every
    /// platform and every run.
    pub fn list(target: &Path) -> Result<Listing, OrganizeError> {
        let mut listing = Listing::default();

        let walker = WalkDir::new(target)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let message = e.to_string();
                OrganizeError::ReadDirectory {
                    path: target.to_path_buf(),
                    source: e.into_io_error().unwrap_or_else(|| io::Error::other(message)),
                }
            })?;

            let file_type = entry.file_type();
            let path = entry.into_path();

            if file_type.is_file() || (file_type.is_symlink() && links_to_file(&path)) {
                listing.files.push(path);
            } else if file_type.is_dir() && is_staging_dir(&path) {
                listing.stale_staging.push(path);
            } else {
                listing.others.push(path);
            }
        }

        Ok(listing)
    }

    /// Fingerprint and score one file
    pub fn inspect(&self, path: &Path) -> Result<ScannedAsset, AssetError> {
        let fingerprint = self.fingerprinter.fingerprint(path)?;
        let score = self.evaluator.evaluate(path)?;

        Ok(ScannedAsset {
            path: path.to_path_buf(),
            fingerprint,
            score,
        })
    }

    /// Read every file in `target`. Per-file failures are collected as
    /// skipped files; only a failure to list the directory is an error.
    pub fn scan(&self, target: &Path, events: &EventSender) -> Result<ScanOutcome, OrganizeError> {
        let listing = Self::list(target)?;
        let total = listing.files.len();

        events.send(Event::Scan(ScanEvent::Started { total_files: total }));

        let completed = AtomicUsize::new(0);
        let inspect = |path: &PathBuf| {
            let result = self.inspect(path);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                completed: done,
                total,
                current_path: path.clone(),
            })));
            result
        };

        // collect() keeps enumeration order even on the rayon pool
        let results: Vec<Result<ScannedAsset, AssetError>> = if self.parallel {
            listing.files.par_iter().map(|p| inspect(p)).collect()
        } else {
            listing.files.iter().map(|p| inspect(p)).collect()
        };

        let mut outcome = ScanOutcome {
            others: listing.others,
            total_files: total,
            ..Default::default()
        };

        for result in results {
            match result {
                Ok(asset) => {
                    debug!(
                        path = %asset.path.display(),
                        fingerprint = %asset.fingerprint,
                        resolution = asset.score.resolution,
                        bytes = asset.score.byte_size,
                        "scored asset"
                    );
                    outcome.assets.push(asset);
                }
                Err(error) => {
                    let path = error.path().clone();
                    warn!(path = %path.display(), %error, "skipping file");
                    events.send(Event::Scan(ScanEvent::Skipped {
                        path: path.clone(),
                        message: error.to_string(),
                    }));
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: error.to_string(),
                    });
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            scored: outcome.assets.len(),
            skipped: outcome.skipped.len(),
        }));

        Ok(outcome)
    }
}
