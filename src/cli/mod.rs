//! # CLI Module
//!
//! ## Usage
//! ```bash
//! # Whole pipeline: images, messages, then deduplicate the images
//! capture-assets run sources/capture.har
//!
//! # Only deduplicate an asset folder, previewing first
//! capture-assets organize assets --dry-run
//! capture-assets organize assets --output json
//!
//! # Individual extraction steps
//! capture-assets extract-images sources/capture.har assets
//! capture-assets extract-messages sources/capture.har --output delivery.log --format log
//! ```

use capture_assets::core::archive::{
    extract_images, extract_messages, write_history_json, write_message_log, HarArchive,
};
use capture_assets::core::organize::{OrganizeReport, Organizer};
use capture_assets::core::quality::DecodeDepth;
use capture_assets::error::Result;
use capture_assets::events::{
    null_sender, Event, EventChannel, OrganizeEvent, ScanEvent,
};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;

/// Capture Assets - extract and deduplicate assets from HAR captures
#[derive(Parser, Debug)]
#[command(name = "capture-assets")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keep one best-quality copy of every distinct file in a directory.
    ///
    /// The directory is expected to be a flat pool of images. Files that are
    /// not decodable images, duplicates, and any subdirectories are deleted.
    Organize {
        /// Directory to organize in place
        dir: PathBuf,

        /// Show what would be kept and removed without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Decode all pixels instead of reading image headers only
        #[arg(long)]
        full_decode: bool,

        /// Read files one at a time
        #[arg(long)]
        sequential: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Write base64 image responses from a HAR file to a directory
    ExtractImages {
        /// HAR capture
        har: PathBuf,

        /// Output directory (created if missing)
        out_dir: PathBuf,
    },

    /// Extract message text from a HAR file
    ExtractMessages {
        /// HAR capture
        har: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "out/history.json")]
        output: PathBuf,

        /// Output file format
        #[arg(short, long, default_value = "json")]
        format: MessageFormat,
    },

    /// Extract images and messages, then organize the images
    Run {
        /// HAR capture
        har: PathBuf,

        /// Asset directory
        #[arg(long, default_value = "assets")]
        assets: PathBuf,

        /// Message history file
        #[arg(long, default_value = "out/history.json")]
        history: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON report for scripting
    Json,
    /// Kept paths only
    Minimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MessageFormat {
    /// JSON array of strings
    Json,
    /// One cleaned message per line
    Log,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    capture_assets::init_tracing(cli.verbose);

    match cli.command {
        Commands::Organize {
            dir,
            dry_run,
            full_decode,
            sequential,
            output,
        } => {
            let organizer = Organizer::builder()
                .dry_run(dry_run)
                .parallel(!sequential)
                .decode_depth(if full_decode {
                    DecodeDepth::Full
                } else {
                    DecodeDepth::Header
                })
                .build();
            run_organize(&organizer, &dir, output)
        }
        Commands::ExtractImages { har, out_dir } => run_extract_images(&har, &out_dir),
        Commands::ExtractMessages {
            har,
            output,
            format,
        } => run_extract_messages(&har, &output, format),
        Commands::Run {
            har,
            assets,
            history,
        } => run_all(&har, &assets, &history),
    }
}

fn run_organize(organizer: &Organizer, dir: &Path, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(output, OutputFormat::Pretty);

    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Organize(OrganizeEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Scan(ScanEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Organize(OrganizeEvent::Completed { .. })
                | Event::Organize(OrganizeEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = organizer.organize_with_events(dir, &sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;

    match output {
        OutputFormat::Pretty => print_pretty_report(&term, &report),
        OutputFormat::Json => print_json_report(&report),
        OutputFormat::Minimal => {
            for path in &report.kept {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &OrganizeReport) {
    let heading = if report.dry_run {
        "Dry run complete"
    } else {
        "Organize complete"
    };
    term.write_line(&format!("{} {}", style("✓").green().bold(), heading))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(report.total_files).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} unique assets {}",
        style(report.unique_count).cyan(),
        if report.dry_run { "would be kept" } else { "kept" }
    ))
    .ok();
    term.write_line(&format!(
        "  {} entries {}",
        style(report.removed.len()).cyan(),
        if report.dry_run {
            "would be removed"
        } else {
            "removed"
        }
    ))
    .ok();

    if report.recovered > 0 {
        term.write_line(&format!(
            "  {} files restored from an interrupted run",
            style(report.recovered).yellow()
        ))
        .ok();
    }

    if !report.skipped.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Skipped files:").bold().underlined()))
            .ok();
        for skipped in &report.skipped {
            term.write_line(&format!(
                "  {} {}",
                style("!").yellow(),
                style(&skipped.reason).dim()
            ))
            .ok();
        }
    }

    if report.dry_run && !report.removed.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Would remove:").bold().underlined()))
            .ok();
        for path in &report.removed {
            term.write_line(&format!("  {} {}", style("○").dim(), path.display()))
                .ok();
        }
    }
}

fn print_json_report(report: &OrganizeReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize report: {}", e),
    }
}

fn run_extract_images(har: &Path, out_dir: &Path) -> Result<()> {
    let archive = HarArchive::open(har)?;
    let extraction = extract_images(&archive, out_dir, &null_sender())?;

    let term = Term::stderr();
    term.write_line(&format!(
        "{} Saved {} images to {}",
        style("✓").green().bold(),
        style(extraction.saved.len()).cyan(),
        out_dir.display()
    ))
    .ok();
    if extraction.skipped > 0 {
        term.write_line(&format!(
            "  {} image entries skipped",
            style(extraction.skipped).yellow()
        ))
        .ok();
    }

    Ok(())
}

fn run_extract_messages(har: &Path, output: &Path, format: MessageFormat) -> Result<()> {
    let archive = HarArchive::open(har)?;
    let messages = extract_messages(&archive);

    let term = Term::stderr();
    if messages.is_empty() {
        term.write_line(&format!(
            "{} No message text found in {}",
            style("!").yellow(),
            har.display()
        ))
        .ok();
        return Ok(());
    }

    match format {
        MessageFormat::Json => write_history_json(&messages, output)?,
        MessageFormat::Log => write_message_log(&messages, output)?,
    }

    term.write_line(&format!(
        "{} Saved {} messages to {}",
        style("✓").green().bold(),
        style(messages.len()).cyan(),
        output.display()
    ))
    .ok();

    Ok(())
}

fn run_all(har: &Path, assets: &Path, history: &Path) -> Result<()> {
    let term = Term::stderr();
    let step = |n: usize, label: &str| {
        term.write_line(&format!("{} {}", style(format!("Step {}:", n)).bold(), label))
            .ok();
    };

    let archive = HarArchive::open(har)?;

    step(1, "Extracting images");
    let extraction = extract_images(&archive, assets, &null_sender())?;
    term.write_line(&format!("  {} images saved", style(extraction.saved.len()).cyan()))
        .ok();

    step(2, "Extracting messages");
    let messages = extract_messages(&archive);
    if messages.is_empty() {
        term.write_line(&format!("  {} no message text found", style("!").yellow()))
            .ok();
    } else {
        write_history_json(&messages, history)?;
        term.write_line(&format!(
            "  {} messages saved to {}",
            style(messages.len()).cyan(),
            history.display()
        ))
        .ok();
    }

    step(3, "Organizing assets");
    run_organize(&Organizer::default(), assets, OutputFormat::Pretty)
}
