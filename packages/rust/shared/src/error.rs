//! Error types for sitecache.
//!
//! Library crates use [`SiteError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all sitecache operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the content API.
    #[error("network error: {0}")]
    Network(String),

    /// The content API answered, but reported query errors.
    #[error("content API error: {0}")]
    Api(String),

    /// Response payload did not have the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (duplicate enums, bad input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A content request submitted to a batch is missing a mandatory field.
    #[error("malformed content request '{name}': {reason}")]
    MalformedRequest { name: String, reason: String },

    /// No configured category entry matches a content item's raw code.
    #[error("unresolved category '{value}' for content type '{content_type}'")]
    UnresolvedCategory { content_type: String, value: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteError>;

impl SiteError {
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

    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unresolved(content_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnresolvedCategory {
            content_type: content_type.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SiteError::config("missing base_url");
        assert_eq!(err.to_string(), "config error: missing base_url");

        let err = SiteError::validation("duplicate enum BOARD_MEETING");
        assert!(err.to_string().contains("BOARD_MEETING"));
    }

    #[test]
    fn unresolved_category_names_type_and_value() {
        let err = SiteError::unresolved("meetings", "UNKNOWN_KIND");
        assert_eq!(
            err.to_string(),
            "unresolved category 'UNKNOWN_KIND' for content type 'meetings'"
        );
    }

    #[test]
    fn malformed_request_names_request() {
        let err = SiteError::malformed("frontPageNews", "hash must be specified");
        assert!(err.to_string().contains("frontPageNews"));
        assert!(err.to_string().contains("hash must be specified"));
    }
}
