//! HTTP client wrapper shared by every stage of the pipeline.
//!
//! This module provides the `HttpClient` struct which fetches listing and
//! detail pages as text and streams asset bodies to disk, with proper timeout
//! configuration and error handling.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, PARTIAL_FILE_SUFFIX, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent::BROWSER_USER_AGENT;

/// HTTP client for page fetches and asset downloads.
///
/// This client is designed to be created once and reused for every request
/// of a run, taking advantage of connection pooling. Cloning is cheap.
///
/// # Example
///
/// ```no_run
/// use screenshot_downloader::download::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let html = client.fetch_text("https://steamcommunity.com/").await?;
/// println!("{} bytes of HTML", html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// Successful asset response whose body has not been read yet.
#[derive(Debug)]
pub struct AssetResponse {
    url: String,
    content_type: Option<String>,
    response: reqwest::Response,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Request timeout: 5 minutes
    /// - Browser User-Agent
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(read_timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches a page and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails,
    /// the server answers with a non-2xx status, or the body cannot be read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.send_get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }

    /// Requests an asset and returns the response with its declared content type.
    ///
    /// The body is not read until [`AssetResponse::save_to`] is called.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails or the
    /// server answers with a non-2xx status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_asset(&self, url: &str) -> Result<AssetResponse, DownloadError> {
        let response = self.send_get(url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(std::string::ToString::to_string);
        debug!(content_type = ?content_type, "asset response received");
        Ok(AssetResponse {
            url: url.to_string(),
            content_type,
            response,
        })
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        url::Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        Ok(response)
    }
}

impl AssetResponse {
    /// The declared Content-Type header, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Streams the body to `path`, replacing any existing file.
    ///
    /// The body is written to a sibling `.part` file first and renamed into
    /// place once complete, so `path` only ever holds a whole asset.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Network` if the body stream fails and
    /// `DownloadError::Io` if the file cannot be written or renamed.
    #[instrument(skip(self), fields(url = %self.url, path = %path.display()))]
    pub async fn save_to(self, path: &Path) -> Result<u64, DownloadError> {
        let partial_path = partial_path_for(path);
        let mut file = File::create(&partial_path)
            .await
            .map_err(|e| DownloadError::io(partial_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, self.response, &self.url, &partial_path).await;
        drop(file);

        let bytes_written = match stream_result {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %partial_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&partial_path).await;
                return Err(error);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial_path, path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(DownloadError::io(path.to_path_buf(), e));
        }

        Ok(bytes_written)
    }
}

fn partial_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(|| OsString::from("asset"));
    name.push(PARTIAL_FILE_SUFFIX);
    path.with_file_name(name)
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
