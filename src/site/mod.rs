//! Community site layout: endpoint templates and HTML extraction.
//!
//! The site exposes two page shapes this crate understands:
//!
//! - [`ListingFetcher`] - a profile's paginated screenshot grid, scanned for
//!   detail-page links that carry a screenshot identifier
//! - [`AssetResolver`] - a screenshot's detail page, scanned for the anchor
//!   that links to the full-size image on the asset host
//!
//! Both are matched with fixed patterns rather than parsed as documents.
//!
//! # Example
//!
//! ```no_run
//! use screenshot_downloader::download::HttpClient;
//! use screenshot_downloader::site::{ListingFetcher, ListingSource, SiteEndpoints};
//! use screenshot_downloader::ProfileId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = ListingFetcher::new(HttpClient::new(), SiteEndpoints::default());
//! let ids = fetcher.fetch_page(ProfileId::new(76561197960279927), 1).await?;
//! println!("page 1 lists {} screenshots", ids.len());
//! # Ok(())
//! # }
//! ```

mod detail;
mod listing;

pub use detail::{AssetLocation, AssetResolver};
pub use listing::{ListingFetcher, extract_screenshot_ids};

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use crate::download::DownloadError;
use crate::screenshot::{ProfileId, ScreenshotId};

/// Default community site origin.
pub const DEFAULT_COMMUNITY_BASE: &str = "https://steamcommunity.com";

/// Default origin serving full-size screenshot images.
pub const DEFAULT_ASSET_HOST: &str = "https://steamuserimages-a.akamaihd.net";

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Detail-page links on listing pages. Capture 1 is the screenshot identifier.
pub(crate) static LISTING_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)steamcommunity\.com/sharedfiles/filedetails/\?id=([0-9]+?)""#)
});

/// Source of listing pages, one page per call.
///
/// [`ListingFetcher`] is the HTTP implementation; the scanner only depends on
/// this trait.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches one listing page and returns the identifiers on it in document order.
    ///
    /// A page with no identifiers is `Ok(vec![])`, not an error.
    ///
    /// # Errors
    ///
    /// Returns a transient [`DownloadError`] when the page could not be fetched.
    async fn fetch_page(
        &self,
        profile: ProfileId,
        page: u32,
    ) -> Result<Vec<ScreenshotId>, DownloadError>;
}

/// Origins of the community site and its asset host.
///
/// Both are configurable so the pipeline can run against a mirror or a local
/// mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEndpoints {
    community_base: String,
    asset_host: String,
}

impl Default for SiteEndpoints {
    fn default() -> Self {
        Self {
            community_base: DEFAULT_COMMUNITY_BASE.to_string(),
            asset_host: DEFAULT_ASSET_HOST.to_string(),
        }
    }
}

impl SiteEndpoints {
    /// Creates endpoints from two absolute origins.
    ///
    /// Trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] when either origin is not an
    /// absolute http(s) URL.
    pub fn new(community_base: &str, asset_host: &str) -> Result<Self, DownloadError> {
        Ok(Self {
            community_base: normalize_origin(community_base)?,
            asset_host: normalize_origin(asset_host)?,
        })
    }

    /// Community site origin, without trailing slash.
    #[must_use]
    pub fn community_base(&self) -> &str {
        &self.community_base
    }

    /// Asset host origin, without trailing slash.
    #[must_use]
    pub fn asset_host(&self) -> &str {
        &self.asset_host
    }

    /// URL of one page of a profile's screenshot grid.
    #[must_use]
    pub fn listing_url(&self, profile: ProfileId, page: u32) -> String {
        format!(
            "{}/profiles/{profile}/screenshots?p={page}&browsefilter=myfiles&view=grid&privacy=30",
            self.community_base
        )
    }

    /// URL of a screenshot's detail page.
    #[must_use]
    pub fn detail_url(&self, id: ScreenshotId) -> String {
        format!("{}/sharedfiles/filedetails/?id={id}", self.community_base)
    }
}

fn normalize_origin(value: &str) -> Result<String, DownloadError> {
    let trimmed = value.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|_| DownloadError::invalid_url(value))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(DownloadError::invalid_url(value));
    }
    Ok(trimmed.to_string())
}
