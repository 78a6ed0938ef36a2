//! Screenshot Downloader Library
//!
//! This library retrieves every screenshot published on a Steam community
//! profile. It works in two stages:
//!
//! 1. A sequential page scan walks the profile's paginated screenshot grid
//!    and collects screenshot identifiers until the pages run dry.
//! 2. A bounded-concurrency download engine resolves each identifier to its
//!    image through the screenshot's detail page and writes it to disk.
//!
//! # Architecture
//!
//! - [`screenshot`] - Identifier newtypes for profiles and screenshots
//! - [`site`] - Endpoint layout and HTML extraction for listing/detail pages
//! - [`scan`] - Pagination scanner with end-of-pages detection
//! - [`download`] - HTTP client, retry policy, per-item downloader and engine

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod scan;
pub mod screenshot;
pub mod site;
mod user_agent;

// Re-export commonly used types
pub use download::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DownloadEngine, DownloadError, DownloadOutcome,
    DownloadReport, DownloadStats, EngineError, FailureType, HttpClient, RetryDecision,
    RetryPolicy, ScreenshotDownloader, classify_error,
};
pub use scan::{PageScanner, ScanPolicy, ScanReport, ScanTermination};
pub use screenshot::{ParseIdError, ProfileId, ScreenshotId};
pub use site::{AssetResolver, ListingFetcher, ListingSource, SiteEndpoints};
pub use user_agent::BROWSER_USER_AGENT;
