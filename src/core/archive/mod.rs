//! # Archive Module
//!
//! Reads HAR captures and extracts the two artifacts the organizer and
//! downstream tools consume:
//! - `images` - base64 image responses written to an asset directory
//! - `messages` - message text fragments found in response bodies

mod har;
mod images;
mod messages;

pub use har::{HarArchive, HarContent, HarEntry, HarLog, HarResponse};
pub use images::{extension_for, extract_images, ImageExtraction};
pub use messages::{
    clean_text, extract_messages, messages_in, write_history_json, write_message_log,
};
