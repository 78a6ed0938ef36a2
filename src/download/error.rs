//! Error types for the download module.
//!
//! This module defines structured errors for every network and disk operation
//! in the pipeline, carrying the URL, path or identifier needed to diagnose a
//! failure from a single log line.

use std::path::PathBuf;

use thiserror::Error;

use crate::screenshot::ScreenshotId;

/// Errors that can occur while fetching pages or downloading assets.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing an asset.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The detail page contained no link to an image asset.
    #[error("couldn't find image link for screenshot {id}")]
    NoAssetLink {
        /// The screenshot whose detail page had no asset link.
        id: ScreenshotId,
    },

    /// The asset response declared a content type with no known extension.
    #[error("unsupported content type '{content_type}' for {url}")]
    UnsupportedContentType {
        /// The asset URL.
        url: String,
        /// The declared Content-Type header value.
        content_type: String,
    },

    /// The asset response carried no Content-Type header.
    #[error("missing Content-Type header for {url}")]
    MissingContentType {
        /// The asset URL.
        url: String,
    },

    /// The asset URL does not contain the `ugc/<segment>/` layout file names are derived from.
    #[error("cannot derive a file name from asset URL {url}")]
    InvalidAssetUrl {
        /// The asset URL.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    ///
    /// Timeouts are split out into [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a missing asset link error.
    #[must_use]
    pub fn no_asset_link(id: ScreenshotId) -> Self {
        Self::NoAssetLink { id }
    }

    /// Creates an unsupported content type error.
    pub fn unsupported_content_type(
        url: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedContentType {
            url: url.into(),
            content_type: content_type.into(),
        }
    }

    /// Creates a missing content type error.
    pub fn missing_content_type(url: impl Into<String>) -> Self {
        Self::MissingContentType { url: url.into() }
    }

    /// Creates an invalid asset URL error.
    pub fn invalid_asset_url(url: impl Into<String>) -> Self {
        Self::InvalidAssetUrl { url: url.into() }
    }
}

// Note on From trait implementations:
// `From<reqwest::Error>` and `From<std::io::Error>` are deliberately absent.
// Every variant needs a URL or path the source error does not carry, so callers
// go through the constructors above.
