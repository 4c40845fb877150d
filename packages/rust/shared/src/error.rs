//! Error types for navtree.
//!
//! Library crates use [`NavTreeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all navtree operations.
#[derive(Debug, thiserror::Error)]
pub enum NavTreeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// Headless browser launch, navigation, or evaluation error.
    #[error("browser error: {0}")]
    Browser(String),

    /// The page never reached its ready state within the bound.
    #[error("timed out after {waited_secs}s waiting for {url} to become ready")]
    FetchTimeout { url: String, waited_secs: u64 },

    /// Selector compilation or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A navigation item lacks the sub-elements the selectors expect.
    #[error("malformed navigation item: {message}")]
    MalformedItem { message: String },

    /// The navigation tree nests deeper than the configured bound.
    #[error("navigation tree exceeds maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding/decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Data validation error (invalid URL, bad selector value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NavTreeError>;

impl NavTreeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a malformed-item error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedItem {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for NavTreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
