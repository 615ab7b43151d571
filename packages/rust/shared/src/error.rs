//! Error types for SiteContext.
//!
//! Library crates use [`SiteContextError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for all SiteContext operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteContextError {
    /// A single page could not be fetched.
    ///
    /// Fatal for the start page of a crawl; secondary pages turn this into a
    /// [`SkippedPage`](crate::SkippedPage) instead.
    #[error("failed to fetch {url}: {kind}")]
    Fetch { url: String, kind: FetchErrorKind },

    /// HTTP client construction error.
    #[error("network error: {0}")]
    Network(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Invalid input (e.g. a target URL that cannot be parsed).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// DNS, connection, TLS or redirect failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be read as text.
    #[error("body read failed: {0}")]
    Body(String),

    /// The URL points at a loopback/private host and private hosts are not allowed.
    #[error("refusing to fetch private or local host")]
    Blocked,

    /// A secondary page redirected away from the start page's origin.
    #[error("redirected off-origin to {0}")]
    OffOrigin(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteContextError>;

impl SiteContextError {
    /// Create a fetch error for `url`.
    pub fn fetch(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self::Fetch {
            url: url.into(),
            kind,
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// The fetch failure kind, if this is a fetch error.
    pub fn fetch_kind(&self) -> Option<&FetchErrorKind> {
        match self {
            Self::Fetch { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SiteContextError::config("max_pages must be a number");
        assert_eq!(err.to_string(), "config error: max_pages must be a number");

        let err = SiteContextError::fetch("https://example.com/", FetchErrorKind::Status(503));
        assert_eq!(err.to_string(), "failed to fetch https://example.com/: HTTP 503");
    }

    #[test]
    fn fetch_kind_accessor() {
        let err = SiteContextError::fetch("https://example.com/", FetchErrorKind::Timeout);
        assert_eq!(err.fetch_kind(), Some(&FetchErrorKind::Timeout));

        let err = SiteContextError::validation("URL is empty");
        assert!(err.fetch_kind().is_none());
    }

    #[test]
    fn off_origin_reason_serializes_with_target() {
        let kind = FetchErrorKind::OffOrigin("https://other.com/x".into());
        assert_eq!(kind.to_string(), "redirected off-origin to https://other.com/x");

        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "off_origin");
        assert_eq!(json["detail"], "https://other.com/x");
    }
}
