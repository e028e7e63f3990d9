//! Signals exchanged with the host page.
//!
//! Both directions are JSON objects tagged by an `event` field, e.g.
//! `{"event": "content_update", "content": "# Notes"}`.

use crate::upload::{UploadReply, UploadRequest};
use serde::{Deserialize, Serialize};

/// Signals the host pushes into the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// New canonical content (may be an echo of our own change)
    ContentUpdate { content: String },
    ClearForm,
    FormSubmit,
    ValidationError {
        #[serde(default)]
        errors: Vec<String>,
    },
    ImagesUploaded { files: Vec<UploadReply> },
}

/// Signals the editor sends to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientSignal {
    UploadImage(UploadRequest),
    ContentChanged { field: String, content: String },
}
