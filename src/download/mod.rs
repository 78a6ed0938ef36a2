//! Screenshot download pipeline: HTTP client, retries, naming and the engine.
//!
//! # Features
//!
//! - One pooled HTTP client with a browser User-Agent for every request
//! - Per-screenshot retry with linear backoff (3s, 6s by default)
//! - Content-Type to extension mapping for the image types the site serves
//! - Streaming writes through a `.part` file renamed into place
//! - Semaphore-bounded concurrency (16 by default)

mod client;
mod constants;
mod engine;
mod error;
mod filename;
mod retry;
mod task;

pub use client::{AssetResponse, HttpClient};
pub use engine::{DEFAULT_CONCURRENCY, DownloadEngine, DownloadReport, DownloadStats, EngineError};
pub use error::DownloadError;
pub use filename::{FileNameClaims, asset_file_stem, extension_for_content_type};
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error};
pub use task::{DownloadOutcome, ScreenshotDownloader};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
