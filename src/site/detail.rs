//! Detail page resolution: screenshot identifier in, asset URL out.

use std::fmt;

use regex::Regex;
use tracing::{debug, instrument};

use super::SiteEndpoints;
use crate::download::{DownloadError, HttpClient};
use crate::screenshot::ScreenshotId;

/// URL of the full-size image for one screenshot.
///
/// Resolved fresh on every download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation(String);

impl AssetLocation {
    /// The asset URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves screenshots to asset URLs through their detail pages.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    client: HttpClient,
    endpoints: SiteEndpoints,
    asset_link: Regex,
}

impl AssetResolver {
    /// Creates a resolver that looks for links onto `endpoints.asset_host()`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] if the asset host cannot be
    /// turned into a link pattern.
    pub fn new(client: HttpClient, endpoints: SiteEndpoints) -> Result<Self, DownloadError> {
        let asset_link = asset_link_regex(endpoints.asset_host())?;
        Ok(Self {
            client,
            endpoints,
            asset_link,
        })
    }

    /// Fetches the detail page for `id` and returns the first asset link on it.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::NoAssetLink`] when the page has no matching anchor
    /// - network errors from fetching the page
    #[instrument(skip(self), fields(screenshot = %id))]
    pub async fn resolve(&self, id: ScreenshotId) -> Result<AssetLocation, DownloadError> {
        let url = self.endpoints.detail_url(id);
        let html = self.client.fetch_text(&url).await?;
        let location = self
            .extract_asset_url(&html)
            .ok_or_else(|| DownloadError::no_asset_link(id))?;
        debug!(asset = %location, "asset link resolved");
        Ok(location)
    }

    /// Returns the first asset link in a detail page body.
    ///
    /// Detail pages can link the image more than once; the first anchor is the
    /// full-size one.
    #[must_use]
    pub fn extract_asset_url(&self, html: &str) -> Option<AssetLocation> {
        self.asset_link
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| AssetLocation(m.as_str().to_string()))
    }
}

fn asset_link_regex(asset_host: &str) -> Result<Regex, DownloadError> {
    let pattern = format!(
        r#"(?is)<a href="({}/ugc/([A-Z0-9/].+?))""#,
        regex::escape(asset_host)
    );
    Regex::new(&pattern).map_err(|_| DownloadError::invalid_url(asset_host))
}
