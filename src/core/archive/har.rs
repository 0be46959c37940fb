//! HAR (HTTP Archive) reader.
//!
//! Only the parts of the format needed for extraction are modelled; every
//! field is optional so captures from different browsers parse alike.

use crate::error::ArchiveError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A parsed HAR capture
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarArchive {
    #[serde(default)]
    pub log: HarLog,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarLog {
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

/// One request/response exchange
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarEntry {
    #[serde(default)]
    pub response: Option<HarResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub content: Option<HarContent>,
}

/// Response body as recorded by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl HarContent {
    /// Body stored as base64
    pub fn is_base64(&self) -> bool {
        self.encoding.as_deref() == Some("base64")
    }

    /// Body bytes, decoding base64 when needed. Whitespace inside base64
    /// text is ignored. `None` when there is no body.
    pub fn decoded_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        let text = self.text.as_deref()?;
        if self.is_base64() {
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            Some(STANDARD.decode(compact))
        } else {
            Some(Ok(text.as_bytes().to_vec()))
        }
    }
}

impl HarEntry {
    /// Response content, if the entry recorded one
    pub fn content(&self) -> Option<&HarContent> {
        self.response.as_ref()?.content.as_ref()
    }
}

impl HarArchive {
    /// Read and parse the HAR file at `path`
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ArchiveError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArchiveError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        Self::parse(&raw, path.to_path_buf())
    }

    /// Parse HAR JSON. `origin` is only used in error messages.
    pub fn parse(json: &str, origin: PathBuf) -> Result<Self, ArchiveError> {
        serde_json::from_str(json).map_err(|e| ArchiveError::Parse {
            path: origin,
            source: e,
        })
    }

    pub fn entries(&self) -> &[HarEntry] {
        &self.log.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "log": {
            "version": "1.2",
            "entries": [
                {"request": {"url": "https://example.com/a.png"},
                 "response": {"status": 200, "content": {"mimeType": "image/png", "encoding": "base64", "text": "aGVs\nbG8="}}},
                {"response": {"content": {"mimeType": "text/html", "text": "<p>hi</p>"}}},
                {"request": {"url": "https://example.com/none"}}
            ]
        }
    }"#;

    #[test]
    fn parses_entries_leniently() {
        let archive = HarArchive::parse(SAMPLE, PathBuf::from("sample.har")).unwrap();

        assert_eq!(archive.entries().len(), 3);
        assert!(archive.entries()[2].content().is_none());

        let png = archive.entries()[0].content().unwrap();
        assert_eq!(png.mime_type, "image/png");
        assert!(png.is_base64());
    }

    #[test]
    fn decodes_base64_with_whitespace() {
        let archive = HarArchive::parse(SAMPLE, PathBuf::from("sample.har")).unwrap();

        let bytes = archive.entries()[0].content().unwrap().decoded_bytes().unwrap().unwrap();
        assert_eq!(bytes, b"hello");

        let html = archive.entries()[1].content().unwrap().decoded_bytes().unwrap().unwrap();
        assert_eq!(html, b"<p>hi</p>");
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = HarArchive::open(&temp.path().join("missing.har"));
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.har");
        fs::write(&path, "{ not json").unwrap();

        let result = HarArchive::open(&path);
        assert!(matches!(result, Err(ArchiveError::Parse { .. })));
    }

    #[test]
    fn empty_object_has_no_entries() {
        let archive = HarArchive::parse("{}", PathBuf::from("empty.har")).unwrap();
        assert!(archive.entries().is_empty());
    }
}
