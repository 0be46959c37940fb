//! # Organize Module
//!
//! Reduces a flat directory of extracted assets to one file per distinct
//! content, keeping the highest-quality copy of each.
//!
//! ## Protocol
//! 0. Restore any staging area an interrupted run left behind
//! 1. List regular files (and symlinks to them) directly inside the target,
//!    sorted by name
//! 2. Fingerprint and score each file; unreadable or undecodable files are
//!    skipped with a warning
//! 3. Group by fingerprint, pick one winner per group, copy winners into a
//!    staging directory nested in the target
//! 4. Remove everything else in the target, including subdirectories
//! 5. Move the staged winners back and remove the staging directory
//!
//! The target is expected to be a flat pool of files. Subdirectories are
//! treated as clutter and deleted in step 4.
//!
//! ## Example
//! ```rust,ignore
//! use capture_assets::core::organize::Organizer;
//!
//! let report = Organizer::builder().build().organize(Path::new("assets"))?;
//! println!("{} unique assets", report.unique_count);
//! ```

mod executor;
mod planner;
mod scanner;
mod types;

pub use executor::{is_staging_dir, OrganizeExecutor, StagingArea, STAGING_PREFIX};
pub use planner::OrganizePlanner;
pub use scanner::{Listing, OrganizeScanner, ScanOutcome};
pub use types::*;

use crate::core::fingerprint::Fingerprinter;
use crate::core::quality::{DecodeDepth, QualityEvaluator};
use crate::error::OrganizeError;
use crate::events::{
    null_sender, Event, EventSender, OrganizeEvent, OrganizePhase, OrganizeSummary,
};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// Builder for [`Organizer`]
#[derive(Debug, Default)]
pub struct OrganizerBuilder {
    config: OrganizeConfig,
}

impl OrganizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every pixel instead of reading headers only
    pub fn decode_depth(mut self, depth: DecodeDepth) -> Self {
        self.config.decode_depth = depth;
        self
    }

    /// Read chunk for fingerprinting
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Read files on the rayon pool (default) or one at a time
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Plan only, leave the directory alone
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn config(mut self, config: OrganizeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Organizer {
        Organizer {
            config: self.config,
        }
    }
}

/// Deduplicates asset directories in place
#[derive(Debug, Default)]
pub struct Organizer {
    config: OrganizeConfig,
}

impl Organizer {
    pub fn builder() -> OrganizerBuilder {
        OrganizerBuilder::new()
    }

    pub fn config(&self) -> &OrganizeConfig {
        &self.config
    }

    /// Organize `target` without progress events
    pub fn organize(&self, target: &Path) -> Result<OrganizeReport, OrganizeError> {
        self.organize_with_events(target, &null_sender())
    }

    /// Organize `target`, reporting progress on `events`
    pub fn organize_with_events(
        &self,
        target: &Path,
        events: &EventSender,
    ) -> Result<OrganizeReport, OrganizeError> {
        events.send(Event::Organize(OrganizeEvent::Started {
            target: target.to_path_buf(),
        }));

        let result = self.run(target, events);

        if let Err(ref e) = result {
            error!(dir = %target.display(), error = %e, "organize failed");
            events.send(Event::Organize(OrganizeEvent::Error {
                message: e.to_string(),
            }));
        }

        result
    }

    fn run(&self, target: &Path, events: &EventSender) -> Result<OrganizeReport, OrganizeError> {
        let start = Instant::now();
        check_target(target)?;

        let phase = |phase: OrganizePhase| {
            info!(%phase, dir = %target.display(), "organize phase");
            events.send(Event::Organize(OrganizeEvent::PhaseChanged { phase }));
        };

        let recovered = if self.config.dry_run {
            0
        } else {
            phase(OrganizePhase::Recovering);
            OrganizeExecutor::recover(target, events)?
        };

        phase(OrganizePhase::Scanning);
        let scanner = OrganizeScanner::new(
            Fingerprinter::new(self.config.chunk_size),
            QualityEvaluator::new(self.config.decode_depth),
            self.config.parallel,
        );
        let outcome = scanner.scan(target, events)?;

        phase(OrganizePhase::Grouping);
        let plan = OrganizePlanner::create_plan(target.to_path_buf(), outcome);

        let (kept, removed_count) = if self.config.dry_run {
            let kept = plan.winners().map(|w| w.path.clone()).collect();
            (kept, plan.removals.len())
        } else {
            phase(OrganizePhase::Staging);
            let staging = OrganizeExecutor::stage(&plan, events)?;

            phase(OrganizePhase::Replacing);
            let purged = OrganizeExecutor::purge(target, &staging, events)?;
            let kept = OrganizeExecutor::promote(target, staging, events)?;
            // Winners were purged and moved back in, so they don't count
            (kept, purged.saturating_sub(plan.unique_count()))
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        let report = OrganizeReport {
            target: target.to_path_buf(),
            total_files: plan.total_files,
            unique_count: plan.unique_count(),
            kept,
            removed: plan.removals.clone(),
            skipped: plan.skipped.clone(),
            recovered,
            duration_ms,
            dry_run: self.config.dry_run,
        };

        events.send(Event::Organize(OrganizeEvent::Completed {
            summary: OrganizeSummary {
                total_files: report.total_files,
                unique_count: report.unique_count,
                removed_count,
                skipped_count: report.skipped.len(),
                duration_ms,
            },
        }));

        info!(
            dir = %target.display(),
            unique = report.unique_count,
            removed = removed_count,
            skipped = report.skipped.len(),
            dry_run = report.dry_run,
            "organize complete"
        );

        Ok(report)
    }
}

/// Organize `target` with default settings
pub fn organize(target: &Path) -> Result<OrganizeReport, OrganizeError> {
    Organizer::default().organize(target)
}

fn check_target(target: &Path) -> Result<(), OrganizeError> {
    match fs::metadata(target) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::NotADirectory {
            path: target.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OrganizeError::DirectoryNotFound {
            path: target.to_path_buf(),
        }),
        Err(e) => Err(OrganizeError::ReadDirectory {
            path: target.to_path_buf(),
            source: e,
        }),
    }
}
