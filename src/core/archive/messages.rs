//! Pulls chat message text out of captured response bodies.
//!
//! Bodies are scanned for `"message":{"text":"..."}` fragments. This works on
//! partial JSON, streamed JSON lines and JSON with anti-hijacking prefixes
//! alike, none of which a JSON parser would accept.

use super::har::HarArchive;
use crate::error::ArchiveError;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// A JSON string body: plain characters or one of the JSON escapes.
const MESSAGE_PATTERN: &str = r#""message":\{"text":"((?:[^"\\]|\\"|\\\\|\\/|\\b|\\f|\\n|\\r|\\t|\\u[0-9a-fA-F]{4})*?)"\}"#;

fn message_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(MESSAGE_PATTERN).expect("message pattern is valid"))
}

/// Every message text found in `body`, unescaped, with newlines removed
pub fn messages_in(body: &str) -> Vec<String> {
    message_regex()
        .captures_iter(body)
        .filter_map(|captures| captures.get(1))
        .map(|raw| {
            let raw = raw.as_str();
            let text = serde_json::from_str::<String>(&format!("\"{}\"", raw))
                .unwrap_or_else(|_| raw.to_string());
            text.replace('\n', "")
        })
        .collect()
}

/// Message texts from every response body in `archive`, in archive order.
///
/// Base64 bodies are decoded first; bytes that are not valid UTF-8 are
/// dropped. Bodies that fail to decode are skipped.
pub fn extract_messages(archive: &HarArchive) -> Vec<String> {
    let mut messages = Vec::new();

    for (index, entry) in archive.entries().iter().enumerate() {
        let Some(content) = entry.content() else {
            continue;
        };

        let body = match content.decoded_bytes() {
            Some(Ok(bytes)) => lossless_utf8(&bytes),
            Some(Err(e)) => {
                debug!(entry = index, error = %e, "skipping undecodable body");
                continue;
            }
            None => continue,
        };

        messages.extend(messages_in(&body));
    }

    info!(count = messages.len(), "message extraction complete");
    messages
}

/// Decode UTF-8, dropping invalid sequences instead of substituting them
fn lossless_utf8(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Tidy free text: no carriage returns, single spaces, trimmed lines and no
/// blank lines.
pub fn clean_text(text: &str) -> String {
    text.replace('\r', "")
        .lines()
        .map(|line| collapse_spaces(line.trim()))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut previous_space = false;
    for c in line.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(c);
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out
}

/// Write `messages` as a pretty JSON array (4-space indent, UTF-8 kept
/// as-is).
pub fn write_history_json(messages: &[String], path: &Path) -> Result<(), ArchiveError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    messages
        .serialize(&mut serializer)
        .map_err(|e| ArchiveError::Write {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    write_creating_parent(path, &buffer)
}

/// Write one message per line, then clean the whole log with [`clean_text`]
pub fn write_message_log(messages: &[String], path: &Path) -> Result<(), ArchiveError> {
    let joined = messages.join("\n");
    write_creating_parent(path, clean_text(&joined).as_bytes())
}

fn write_creating_parent(path: &Path, bytes: &[u8]) -> Result<(), ArchiveError> {
    let write_error = |source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, bytes).map_err(write_error)
}
