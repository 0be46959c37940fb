//! # capture-assets CLI
//!
//! ## Usage
//! ```bash
//! capture-assets run sources/capture.har --assets assets --history out/history.json
//! capture-assets organize assets --dry-run
//! ```

mod cli;

use capture_assets::Result;

fn main() -> Result<()> {
    cli::run()
}
