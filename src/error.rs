//! Error types for hn-stories
//!
//! This module provides the error taxonomy of the fetch pipeline:
//! - Transient transport failures (connection, timeout, non-success HTTP status)
//! - Malformed upstream responses (body does not decode into the expected shape)
//! - Exhausted retries (terminal form of a transient failure)
//! - Configuration errors (rejected before any network call)
//!
//! It also maps every error to an HTTP status code and a structured JSON body
//! for the API layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for hn-stories operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hn-stories
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "retry.max_attempts")
        key: Option<String>,
    },

    /// Transport-level failure (connection refused, timeout, reset)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream call completed with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The response body could not be decoded into the expected shape
    #[error("malformed response from {url}: {source}")]
    Decode {
        /// Requested URL
        url: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A transient failure persisted through every configured attempt
    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The failure of the final attempt
        source: Box<Error>,
    },

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (configuration file parsing)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// The innermost error, looking through [`Error::RetriesExhausted`]
    pub fn root(&self) -> &Error {
        match self {
            Error::RetriesExhausted { source, .. } => source.root(),
            other => other,
        }
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "retries_exhausted",
///     "message": "giving up after 3 attempts: HTTP 503 from https://...",
///     "details": { "attempts": 3 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "retries_exhausted", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 500 Internal Server Error - our own setup is broken
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - upstream answered with garbage
            Error::Decode { .. } => 502,

            // 503 Service Unavailable - upstream unreachable or request abandoned
            Error::Network(_) => 503,
            Error::HttpStatus { .. } => 503,
            Error::RetriesExhausted { .. } => 503,
            Error::Cancelled => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
            Error::HttpStatus { .. } => "upstream_status",
            Error::Decode { .. } => "malformed_response",
            Error::RetriesExhausted { .. } => "retries_exhausted",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::HttpStatus { status, url } => Some(serde_json::json!({
                "status": status,
                "url": url,
            })),
            Error::Decode { url, .. } => Some(serde_json::json!({
                "url": url,
            })),
            Error::RetriesExhausted { attempts, source } => Some(serde_json::json!({
                "attempts": attempts,
                "last_error": source.error_code(),
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
