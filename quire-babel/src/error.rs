//! Error types for format and upload operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Errors reported by an upload collaborator.
///
/// None of these are fatal: the capture pipeline drops the file and leaves
/// the document untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    /// The collaborator answered with an explicit failure
    #[error("upload rejected: {0}")]
    Rejected(String),
    /// The transport went away before a reply arrived
    #[error("upload channel closed before a reply arrived")]
    Disconnected,
    /// The payload could not be encoded or decoded
    #[error("invalid upload payload: {0}")]
    InvalidPayload(String),
    /// Storage-side failure while persisting the bytes
    #[error("upload storage failed: {0}")]
    Storage(String),
}
