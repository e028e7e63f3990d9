//! Image capture and the upload boundary.
//!
//! Files arrive from a drop, a paste or the toolbar picker. Image files are
//! sent to an [`Uploader`] one request each; completions come back in
//! whatever order the uploads finish and are spliced into the document at the
//! cursor remembered when the file was captured.

pub mod bridge;
pub mod capture;

pub use bridge::HostUploader;
pub use capture::{CaptureDecision, Completion, ImageCapture, UploadTicket};

use crate::error::UploadError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use mime_sniffer::MimeTypeSniffer;
use serde::{Deserialize, Serialize};

/// Where a batch of candidate files came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    Drop,
    Paste,
    Toolbar,
}

impl CaptureSource {
    /// Drop and paste only suppress the default when an image is present.
    pub fn always_intercepts(self) -> bool {
        matches!(self, CaptureSource::Toolbar)
    }
}

/// How a stored cursor is mapped onto the document when an upload completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPolicy {
    /// Insert at the raw offset captured with the file
    #[default]
    Offset,
    /// Shift the offset through the edits made since capture
    Anchored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Accepted content-type prefixes (`image/` or exact types)
    pub accept: Vec<String>,
    /// Largest accepted file, in bytes
    pub max_bytes: Option<usize>,
    pub cursor_policy: CursorPolicy,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            accept: vec!["image/".to_string()],
            max_bytes: None,
            cursor_policy: CursorPolicy::Offset,
        }
    }
}

impl CaptureOptions {
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        self.accept
            .iter()
            .any(|prefix| content_type.starts_with(&prefix.to_ascii_lowercase()))
    }
}

/// A file offered by the host, before filtering.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    /// Declared content type, if the source provided one
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Declared type when present, otherwise sniffed from the bytes.
    pub fn resolved_type(&self) -> String {
        match self.content_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => declared.to_string(),
            _ => self
                .data
                .sniff_mime_type()
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }
}

/// An accepted image on its way to the uploader.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: Bytes,
}

impl PendingUpload {
    pub fn to_request(&self, request_id: u64) -> UploadRequest {
        UploadRequest {
            request_id,
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            size: self.size,
            data: STANDARD.encode(&self.data),
        }
    }
}

/// Outbound upload payload; `data` is base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub request_id: u64,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: String,
}

impl UploadRequest {
    pub fn decode(&self) -> Result<Vec<u8>, UploadError> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| UploadError::InvalidPayload(e.to_string()))
    }
}

/// One entry of an `images_uploaded` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadOutcome {
    Uploaded { url: String },
    Failed { error: String },
}

impl UploadOutcome {
    pub fn into_result(self) -> Result<String, UploadError> {
        match self {
            UploadOutcome::Uploaded { url } => Ok(url),
            UploadOutcome::Failed { error } => Err(UploadError::Rejected(error)),
        }
    }
}

/// The collaborator that stores image bytes and hands back a reference.
#[async_trait(?Send)]
pub trait Uploader {
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn declared_type_wins() {
        let file = CandidateFile::new("a.bin", Some("image/gif".to_string()), PNG_MAGIC.to_vec());
        assert_eq!(file.resolved_type(), "image/gif");
    }

    #[test]
    fn missing_type_is_sniffed() {
        let file = CandidateFile::new("a", None, PNG_MAGIC.to_vec());
        assert_eq!(file.resolved_type(), "image/png");

        let text = CandidateFile::new("notes", Some(String::new()), b"plain words".to_vec());
        assert!(!text.resolved_type().starts_with("image/"));
    }

    #[test]
    fn accept_list_matches_prefixes_case_insensitively() {
        let options = CaptureOptions::default();
        assert!(options.accepts("image/png"));
        assert!(options.accepts("IMAGE/JPEG"));
        assert!(!options.accepts("application/pdf"));
    }

    #[test]
    fn request_payload_is_base64() {
        let pending = PendingUpload {
            filename: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            size: 3,
            data: Bytes::from_static(b"abc"),
        };
        let request = pending.to_request(7);
        assert_eq!(request.data, "YWJj");
        assert_eq!(request.decode(), Ok(b"abc".to_vec()));
    }

    #[test]
    fn replies_parse_url_or_error() {
        let ok: UploadReply = serde_json::from_str(r#"{"url": "/uploads/a.png"}"#).expect("reply");
        assert_eq!(ok.outcome.into_result(), Ok("/uploads/a.png".to_string()));

        let failed: UploadReply =
            serde_json::from_str(r#"{"request_id": 3, "error": "too big"}"#).expect("reply");
        assert_eq!(failed.request_id, Some(3));
        assert_eq!(
            failed.outcome.into_result(),
            Err(UploadError::Rejected("too big".to_string()))
        );
    }
}
