//! One run: scan the profile, then download what was found.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use screenshot_downloader::{
    AssetResolver, DownloadEngine, DownloadStats, HttpClient, ListingFetcher, PageScanner,
    ProfileId, RetryPolicy, ScanPolicy, ScanTermination, ScreenshotDownloader, SiteEndpoints,
};
use tracing::{debug, info, warn};

use crate::app::exit_handler::{ProcessExit, determine_exit_outcome};
use crate::app::progress_manager::{should_use_spinner, spawn_progress_ui};
use crate::cli::Args;

/// Runs the scan and download stages for `profile`.
pub(crate) async fn run(args: &Args, profile: ProfileId) -> Result<ProcessExit> {
    let endpoints = SiteEndpoints::new(&args.community_url, &args.asset_host)
        .context("invalid site endpoint")?;
    let engine = DownloadEngine::new(usize::from(args.concurrency))?;

    let output_dir = args.output_dir.join(profile.download_dir_name());
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    debug!(dir = %output_dir.display(), "output directory ready");

    let client = HttpClient::new();

    let fetcher = ListingFetcher::new(client.clone(), endpoints.clone());
    let report = PageScanner::new(ScanPolicy::default())
        .scan(&fetcher, profile)
        .await;

    match report.termination {
        ScanTermination::EndOfPages { last_page } => {
            info!(last_page, "no more screenshot pages");
        }
        ScanTermination::PageFailuresExhausted { page } => {
            warn!(page, "stopped scanning after repeated page failures");
        }
    }

    if report.is_empty() {
        info!(%profile, "no screenshots found, is the profile set to private?");
        return Ok(ProcessExit::Success);
    }

    info!(screenshots = report.len(), "found screenshots");

    let resolver = AssetResolver::new(client.clone(), endpoints)?;
    let downloader = Arc::new(ScreenshotDownloader::new(
        client,
        resolver,
        output_dir.clone(),
        RetryPolicy::with_max_attempts(u32::from(args.max_retries)),
    ));

    let stats = Arc::new(DownloadStats::new());
    let use_spinner = should_use_spinner(io::stderr().is_terminal(), args.quiet);
    let (progress, stop) = spawn_progress_ui(use_spinner, Arc::clone(&stats), report.len());

    let result = engine
        .process(&report.screenshots, downloader, Arc::clone(&stats))
        .await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress {
        let _ = handle.await;
    }
    let downloads = result?;

    info!(
        found = report.len(),
        completed = downloads.completed(),
        failed = downloads.failed(),
        retried = stats.retried(),
        dir = %output_dir.display(),
        "all done"
    );

    Ok(determine_exit_outcome(stats.completed(), stats.failed()))
}
