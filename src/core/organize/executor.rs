//! Staged replace of a directory's contents.
//!
//! Winners are copied into a staging directory nested inside the target (so
//! the final moves are same-filesystem renames), the target is cleared, and
//! the staged files are moved back. If anything fails after the target has
//! been touched, the staging directory is left in place and
//! [`OrganizeExecutor::recover`] restores it on the next run.

use super::types::OrganizePlan;
use crate::error::OrganizeError;
use crate::events::{Event, EventSender, ReplaceEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Name prefix of staging directories
pub const STAGING_PREFIX: &str = ".capture-assets-staging-";

/// True if `path` names a staging directory
pub fn is_staging_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with(STAGING_PREFIX))
}

/// A populated staging directory
#[derive(Debug)]
pub struct StagingArea {
    pub path: PathBuf,
    /// Staged copies in plan order
    pub files: Vec<PathBuf>,
}

/// Executes organization plans
pub struct OrganizeExecutor;

impl OrganizeExecutor {
    /// Move back files left in staging directories by an interrupted run.
    ///
    /// A staged file is restored only if nothing with its name exists in the
    /// target; otherwise the target copy is the original and the staged one
    /// is discarded. Returns the number of files restored.
    pub fn recover(target: &Path, events: &EventSender) -> Result<usize, OrganizeError> {
        let entries = fs::read_dir(target).map_err(|e| OrganizeError::ReadDirectory {
            path: target.to_path_buf(),
            source: e,
        })?;

        let mut stale = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| OrganizeError::ReadDirectory {
                path: target.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if is_staging_dir(&path) && path.is_dir() {
                stale.push(path);
            }
        }
        stale.sort();

        let mut restored_total = 0;
        for staging in stale {
            let restored = Self::restore_from(target, &staging)
                .map_err(|e| OrganizeError::Recover {
                    path: staging.clone(),
                    source: e,
                })?;

            warn!(
                staging = %staging.display(),
                restored,
                "recovered staging area from an interrupted run"
            );
            events.send(Event::Replace(ReplaceEvent::Recovered {
                staging,
                restored,
            }));
            restored_total += restored;
        }

        Ok(restored_total)
    }

    fn restore_from(target: &Path, staging: &Path) -> io::Result<usize> {
        let mut restored = 0;

        for entry in fs::read_dir(staging)? {
            let entry = entry?;
            let staged = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }

            let destination = target.join(entry.file_name());
            if destination.symlink_metadata().is_ok() {
                fs::remove_file(&staged)?;
            } else {
                fs::rename(&staged, &destination)?;
                restored += 1;
            }
        }

        fs::remove_dir_all(staging)?;
        Ok(restored)
    }

    /// Copy every winner of `plan` into a fresh staging directory.
    ///
    /// On failure the partial staging directory is removed and the target is
    /// left exactly as it was.
    pub fn stage(plan: &OrganizePlan, events: &EventSender) -> Result<StagingArea, OrganizeError> {
        let staging = plan
            .target
            .join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4().simple()));

        fs::create_dir(&staging).map_err(|e| OrganizeError::Stage {
            path: staging.clone(),
            source: e,
        })?;

        let mut files = Vec::with_capacity(plan.unique_count());
        for winner in plan.winners() {
            match Self::stage_file(&winner.path, &staging) {
                Ok(staged) => {
                    debug!(path = %winner.path.display(), "staged");
                    events.send(Event::Replace(ReplaceEvent::Staged {
                        path: winner.path.clone(),
                    }));
                    files.push(staged);
                }
                Err(e) => {
                    let _ = fs::remove_dir_all(&staging);
                    return Err(OrganizeError::Stage {
                        path: winner.path.clone(),
                        source: e,
                    });
                }
            }
        }

        Ok(StagingArea {
            path: staging,
            files,
        })
    }

    fn stage_file(source: &Path, staging: &Path) -> io::Result<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let destination = staging.join(name);

        let source_size = fs::metadata(source)?.len();
        fs::copy(source, &destination)?;

        let dest_size = fs::metadata(&destination)?.len();
        if dest_size != source_size {
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, staged {} bytes",
                source_size, dest_size
            )));
        }

        Ok(destination)
    }

    /// Remove every entry of the target except the staging directory.
    ///
    /// Subdirectories are removed recursively. Returns how many entries
    /// were removed.
    pub fn purge(target: &Path, staging: &StagingArea, events: &EventSender) -> Result<usize, OrganizeError> {
        let purge_error = |path: &Path, source| OrganizeError::Purge {
            path: path.to_path_buf(),
            staging: staging.path.clone(),
            source,
        };

        let entries = fs::read_dir(target).map_err(|e| purge_error(target, e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| purge_error(target, e))?;
            let path = entry.path();
            if path == staging.path {
                continue;
            }

            let file_type = entry.file_type().map_err(|e| purge_error(&path, e))?;
            let result = if file_type.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|e| purge_error(&path, e))?;

            events.send(Event::Replace(ReplaceEvent::Purged { path }));
            removed += 1;
        }

        Ok(removed)
    }

    /// Move staged files into the target and remove the staging directory.
    ///
    /// Returns the final paths.
    pub fn promote(target: &Path, staging: StagingArea, events: &EventSender) -> Result<Vec<PathBuf>, OrganizeError> {
        let promote_error = |path: &Path, source| OrganizeError::Promote {
            path: path.to_path_buf(),
            staging: staging.path.clone(),
            source,
        };

        let mut kept = Vec::with_capacity(staging.files.len());
        for staged in &staging.files {
            let name = staged.file_name().ok_or_else(|| {
                promote_error(
                    staged,
                    io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;
            let destination = target.join(name);

            fs::rename(staged, &destination).map_err(|e| promote_error(staged, e))?;

            events.send(Event::Replace(ReplaceEvent::Promoted {
                path: destination.clone(),
            }));
            kept.push(destination);
        }

        fs::remove_dir(&staging.path).map_err(|e| promote_error(&staging.path, e))?;
        info!(count = kept.len(), "moved unique assets into place");

        Ok(kept)
    }
}
