//! Error types for Vocalens.
//!
//! Backend failures are classified into a small closed set of kinds so callers
//! can tell terminal failures (bad key, missing model) from transient ones
//! (rate limits, network).

use std::fmt;
use thiserror::Error;

/// Top-level error type for Vocalens operations.
#[derive(Error, Debug)]
pub enum VocalensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image loading or encoding errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Remote backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session could not start
    #[error(transparent)]
    Session(#[from] SessionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors while accepting or preparing an uploaded image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image is empty")]
    Empty,

    #[error("Image too large: {size_mb}MB > {max_mb}MB")]
    TooLarge { size_mb: u64, max_mb: u64 },

    #[error("Image dimensions too large: {width}x{height} > {max_dim}")]
    DimensionsTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Only PNG and JPEG uploads are accepted
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image as PNG: {0}")]
    Encode(String),

    #[error("Failed to read image: {0}")]
    Read(#[from] std::io::Error),
}

/// Returned by `Session::start` when no vision model answers.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No vision model available (tried {primary} and {fallback})")]
    VisionUnavailable { primary: String, fallback: String },
}

/// Closed classification of backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Missing, invalid or unentitled API key (401/403)
    Auth,
    /// Quota exhausted or rate limited (429)
    RateLimited,
    /// Model does not exist or is not enabled (404)
    ModelNotFound,
    /// Connection, DNS, timeout or body stream failure
    Transport,
    /// Response body could not be parsed or carried no content
    MalformedResponse,
    /// Any other non-success status
    Api,
}

impl BackendErrorKind {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::RateLimited,
            404 => Self::ModelNotFound,
            _ => Self::Api,
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auth => "authorization failed",
            Self::RateLimited => "rate limited",
            Self::ModelNotFound => "model not found",
            Self::Transport => "transport error",
            Self::MalformedResponse => "malformed response",
            Self::Api => "API error",
        };
        f.write_str(s)
    }
}

/// A failed call to a remote backend.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// HTTP status, when the server answered
    pub status_code: Option<u16>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// Build from a non-success HTTP status and the response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            kind: BackendErrorKind::from_status(status),
            message: format!("HTTP {status}: {body}"),
            status_code: Some(status),
        }
    }

    /// Error for a backend called without its API key.
    pub fn missing_key(env_var: &str) -> Self {
        Self::new(
            BackendErrorKind::Auth,
            format!("API key not set. Set {env_var} env var."),
        )
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Rate limits, transport failures and 5xx answers are transient; auth
    /// failures, missing models and malformed responses are not.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            BackendErrorKind::RateLimited | BackendErrorKind::Transport => true,
            BackendErrorKind::Api => self
                .status_code
                .is_some_and(|code| (500..=599).contains(&code)),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::new(BackendErrorKind::MalformedResponse, e.to_string())
        } else {
            Self::new(BackendErrorKind::Transport, e.to_string())
        }
    }
}

/// Convenience type alias for Vocalens results.
pub type Result<T> = std::result::Result<T, VocalensError>;
