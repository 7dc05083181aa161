//! Error types for the Freshservice contacts client.
//!
//! # Design
//! `Validation` is the only error raised for a record, before any request
//! leaves the process; `Config` only comes out of `ClientConfig`. Everything
//! else describes a failed round-trip and is handed
//! back to the caller unchanged: `NotFound` gets its own variant because
//! callers often branch on it, other non-2xx responses land in `HttpError`
//! with the raw status and body.

use thiserror::Error;

/// Errors returned by `ContactClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The record was rejected locally; no request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server returned 404: the requested contact does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport could not complete the round-trip at all.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// True when the error was raised before any request was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ApiError::NotFound.to_string(), "resource not found");
        let err = ApiError::HttpError {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429: slow down");
        assert_eq!(
            ApiError::Validation("id is required".to_string()).to_string(),
            "validation failed: id is required"
        );
    }

    #[test]
    fn only_validation_is_local() {
        assert!(ApiError::Validation(String::new()).is_validation());
        assert!(!ApiError::NotFound.is_validation());
        assert!(!ApiError::Transport("refused".to_string()).is_validation());
        assert!(!ApiError::Config("FRESHSERVICE_BASE_URL is not set".to_string()).is_validation());
    }
}
