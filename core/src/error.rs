//! Error types for the Mochi API client.
//!
//! # Design
//! Each failure category gets its own variant so the command boundary can
//! match on the kind instead of inspecting fields. `Network` and `Api` are the
//! two remote outcomes; `Config` and `Validation` are raised locally before any
//! request leaves the process. Retryable responses never appear here: the
//! executor absorbs them and only surfaces the final attempt.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `MochiClient` and the resource clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or blank credential, or an HTTP client that could not be built.
    #[error("{0}")]
    Config(String),

    /// The exchange could not be completed after exhausting retries.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        /// Raw `errors` payload from the response body, if any.
        errors: Option<Value>,
    },

    /// An attachment upload was rejected. Uploads are single-shot and carry
    /// only a message.
    #[error("Failed to upload attachment: {0}")]
    Upload(String),

    /// Caller-supplied input was rejected before sending.
    #[error("{0}")]
    Validation(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    /// HTTP status associated with a remote failure. Network failures report 0.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Network { .. } => Some(0),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Api { status: 404, .. })
    }
}
