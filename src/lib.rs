//! # Capture Assets
//!
//! Turns a browser HAR capture into a clean asset folder and a message
//! history.
//!
//! ## Workflow
//! 1. Extract base64 image responses into an asset directory
//! 2. Extract message text from response bodies
//! 3. Organize the asset directory: one file per distinct content, the
//!    highest-resolution copy winning
//!
//! ## Architecture
//! - `core` - Extraction and deduplication engine
//! - `events` - Progress reporting over channels
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CaptureError, Result};

/// Initialize tracing for the binary.
///
/// Logs go to stderr and are filtered by `RUST_LOG` (default `warn`).
/// Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
