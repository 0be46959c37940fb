//! Integration tests for the organize module.
//!
//! These tests run the full staged replace against real directories:
//! - Duplicate collapse and best-copy selection
//! - Corrupt files mixed with valid ones
//! - Re-running on an already organized directory
//! - Recovery after an interrupted run

use assert_fs::prelude::*;
use capture_assets::core::organize::{organize, Organizer, STAGING_PREFIX};
use capture_assets::core::quality::DecodeDepth;
use capture_assets::error::OrganizeError;
use capture_assets::events::{Event, EventChannel, ScanEvent};
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use predicates::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// PNG bytes of a `size`×`size` image; `seed` varies the pixels
fn png_bytes(size: u32, seed: u8) -> Vec<u8> {
    let image: RgbImage = ImageBuffer::from_fn(size, size, |x, y| {
        Rgb([
            (x as u8).wrapping_mul(7) ^ seed,
            (y as u8).wrapping_mul(13),
            ((x + y) as u8).wrapping_add(seed),
        ])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// File name → content of every entry in `dir` (directories map to empty)
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().into_owned();
            let content = if entry.file_type().unwrap().is_file() {
                fs::read(entry.path()).unwrap()
            } else {
                Vec::new()
            };
            (name, content)
        })
        .collect()
}

#[test]
fn identical_copies_collapse_to_first_by_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    let small = png_bytes(100, 1);
    let large = png_bytes(200, 2);
    temp.child("a.jpg").write_binary(&small).unwrap();
    temp.child("b.jpg").write_binary(&small).unwrap();
    temp.child("c.jpg").write_binary(&large).unwrap();

    let report = organize(temp.path()).unwrap();

    assert_eq!(report.unique_count, 2);
    assert_eq!(report.total_files, 3);
    temp.child("a.jpg").assert(predicate::path::exists());
    temp.child("b.jpg").assert(predicate::path::missing());
    assert_eq!(fs::read(temp.child("c.jpg").path()).unwrap(), large);
    assert_eq!(snapshot(temp.path()).len(), 2);
}

#[test]
fn corrupt_file_is_skipped_with_warning() {
    let temp = assert_fs::TempDir::new().unwrap();
    let valid = png_bytes(150, 3);
    temp.child("x.jpg").write_binary(&valid).unwrap();
    temp.child("y.jpg")
        .write_binary(b"\xFF\xD8 corrupted header")
        .unwrap();

    let (sender, receiver) = EventChannel::new();
    let report = Organizer::default()
        .organize_with_events(temp.path(), &sender)
        .unwrap();

    assert_eq!(report.unique_count, 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("y.jpg"));
    assert_eq!(fs::read(temp.child("x.jpg").path()).unwrap(), valid);
    temp.child("y.jpg").assert(predicate::path::missing());

    let warnings = receiver
        .drain()
        .into_iter()
        .filter(|e| matches!(e, Event::Scan(ScanEvent::Skipped { .. })))
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn second_run_changes_nothing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let first = png_bytes(32, 4);
    let second = png_bytes(48, 5);
    temp.child("one.png").write_binary(&first).unwrap();
    temp.child("one-copy.png").write_binary(&first).unwrap();
    temp.child("two.png").write_binary(&second).unwrap();
    temp.child("notes.txt").write_str("not an image").unwrap();

    let report1 = organize(temp.path()).unwrap();
    let after_first = snapshot(temp.path());

    let report2 = organize(temp.path()).unwrap();
    let after_second = snapshot(temp.path());

    assert_eq!(after_first, after_second);
    assert_eq!(report1.unique_count, report2.unique_count);
    assert!(report2.skipped.is_empty());
    assert!(report2.removed.is_empty());
}

#[test]
fn every_distinct_image_survives_once() {
    let temp = assert_fs::TempDir::new().unwrap();
    for seed in 0..6u8 {
        let bytes = png_bytes(16 + u32::from(seed), seed);
        for copy in 0..=seed % 3 {
            temp.child(format!("img_{}_{}.png", seed, copy))
                .write_binary(&bytes)
                .unwrap();
        }
    }

    let report = Organizer::builder().parallel(true).build().organize(temp.path()).unwrap();

    assert_eq!(report.unique_count, 6);
    let contents: Vec<Vec<u8>> = snapshot(temp.path()).into_values().collect();
    assert_eq!(contents.len(), 6);
    for seed in 0..6u8 {
        let expected = png_bytes(16 + u32::from(seed), seed);
        assert_eq!(contents.iter().filter(|c| **c == expected).count(), 1);
    }
}

#[test]
fn repeated_runs_pick_same_winner() {
    let bytes = png_bytes(20, 9);

    let winners: Vec<_> = (0..3)
        .map(|_| {
            let temp = assert_fs::TempDir::new().unwrap();
            for name in ["zeta.png", "mid.png", "alpha.png"] {
                temp.child(name).write_binary(&bytes).unwrap();
            }
            let report = Organizer::builder().parallel(true).build().organize(temp.path()).unwrap();
            report.kept[0].file_name().unwrap().to_owned()
        })
        .collect();

    assert!(winners.iter().all(|w| w == "alpha.png"));
}

#[test]
fn subdirectories_and_hidden_files_are_handled() {
    let temp = assert_fs::TempDir::new().unwrap();
    let bytes = png_bytes(24, 6);
    temp.child(".hidden.png").write_binary(&bytes).unwrap();
    temp.child("visible.png").write_binary(&bytes).unwrap();
    temp.child("old/run/leftover.png").write_binary(&bytes).unwrap();

    let report = organize(temp.path()).unwrap();

    assert_eq!(report.unique_count, 1);
    // ".hidden.png" sorts first and wins the tie
    temp.child(".hidden.png").assert(predicate::path::exists());
    temp.child("visible.png").assert(predicate::path::missing());
    temp.child("old").assert(predicate::path::missing());
}

#[test]
fn dry_run_leaves_directory_untouched() {
    let temp = assert_fs::TempDir::new().unwrap();
    let bytes = png_bytes(30, 7);
    temp.child("a.png").write_binary(&bytes).unwrap();
    temp.child("b.png").write_binary(&bytes).unwrap();
    temp.child("junk.bin").write_binary(b"junk").unwrap();
    let before = snapshot(temp.path());

    let report = Organizer::builder().dry_run(true).build().organize(temp.path()).unwrap();

    assert!(report.dry_run);
    assert_eq!(report.unique_count, 1);
    assert_eq!(report.kept, vec![temp.path().join("a.png")]);
    assert_eq!(
        report.removed,
        vec![temp.path().join("b.png"), temp.path().join("junk.bin")]
    );
    assert_eq!(snapshot(temp.path()), before);
}

#[test]
fn interrupted_run_is_recovered() {
    let temp = assert_fs::TempDir::new().unwrap();
    let lost = png_bytes(40, 8);
    let present = png_bytes(44, 10);

    // Crash between purge and promote: only the staged copy of "lost.png" exists
    let staging = temp.child(format!("{}deadbeef", STAGING_PREFIX));
    staging.child("lost.png").write_binary(&lost).unwrap();
    temp.child("present.png").write_binary(&present).unwrap();

    let report = organize(temp.path()).unwrap();

    assert_eq!(report.recovered, 1);
    assert_eq!(report.unique_count, 2);
    assert_eq!(fs::read(temp.child("lost.png").path()).unwrap(), lost);
    assert_eq!(fs::read(temp.child("present.png").path()).unwrap(), present);
    staging.assert(predicate::path::missing());
}

#[test]
fn full_decode_rejects_truncated_body() {
    let temp = assert_fs::TempDir::new().unwrap();
    let bytes = png_bytes(64, 11);
    let truncated = &bytes[..bytes.len() * 6 / 10];
    temp.child("cut.png").write_binary(truncated).unwrap();

    let header_only = Organizer::builder().dry_run(true).build().organize(temp.path()).unwrap();
    assert_eq!(header_only.unique_count, 1);

    let full = Organizer::builder()
        .dry_run(true)
        .decode_depth(DecodeDepth::Full)
        .build()
        .organize(temp.path())
        .unwrap();
    assert_eq!(full.unique_count, 0);
    assert_eq!(full.skipped.len(), 1);
}

#[test]
fn missing_directory_is_an_error() {
    let temp = assert_fs::TempDir::new().unwrap();

    let result = organize(&temp.path().join("does-not-exist"));

    assert!(matches!(result, Err(OrganizeError::DirectoryNotFound { .. })));
}

#[cfg(unix)]
#[test]
fn symlinked_image_keeps_its_content() {
    let temp = assert_fs::TempDir::new().unwrap();
    let logo = png_bytes(10, 12);
    let shared = temp.child("shared/logo.png");
    shared.write_binary(&logo).unwrap();
    let assets = temp.child("assets");
    assets.create_dir_all().unwrap();
    std::os::unix::fs::symlink(shared.path(), assets.child("logo.png").path()).unwrap();
    std::os::unix::fs::symlink(temp.child("shared/gone.png").path(), assets.child("dangling.png").path())
        .unwrap();

    let report = organize(assets.path()).unwrap();

    assert_eq!(report.unique_count, 1);
    assert_eq!(report.kept, vec![assets.path().join("logo.png")]);
    assert_eq!(report.removed, vec![assets.path().join("dangling.png")]);
    // The link was replaced by a real copy; the link target is untouched
    let kept = assets.child("logo.png");
    assert!(!fs::symlink_metadata(kept.path()).unwrap().file_type().is_symlink());
    assert_eq!(fs::read(kept.path()).unwrap(), logo);
    assert_eq!(fs::read(shared.path()).unwrap(), logo);
    assert_eq!(snapshot(assets.path()).len(), 1);
}
