//! Progress UI (spinner) for download runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use screenshot_downloader::DownloadStats;

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    stats: Arc<DownloadStats>,
    total: usize,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(stats, total, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    stats: Arc<DownloadStats>,
    total: usize,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(progress_message(&stats, total));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

fn progress_message(stats: &DownloadStats, total: usize) -> String {
    let failed = stats.failed();
    let done = stats.total().min(total);
    if failed == 0 {
        format!("[{done}/{total}] Downloading screenshots...")
    } else {
        format!("[{done}/{total}] Downloading screenshots ({failed} failed)...")
    }
}

/// Spinner only on an interactive, non-quiet stderr.
pub(crate) fn should_use_spinner(stderr_is_terminal: bool, quiet: bool) -> bool {
    stderr_is_terminal && !quiet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_progress_ui_when_disabled_returns_none_handle_and_stop_already_true() {
        let (handle, stop) = spawn_progress_ui(false, Arc::new(DownloadStats::new()), 1);

        assert!(handle.is_none());
        assert!(
            stop.load(Ordering::SeqCst),
            "stop signal should be true when spinner disabled"
        );
    }

    #[tokio::test]
    async fn spawn_progress_ui_when_enabled_stops_on_signal() {
        let (handle, stop) = spawn_progress_ui(true, Arc::new(DownloadStats::new()), 1);

        assert!(handle.is_some(), "handle should be Some when spinner enabled");
        assert!(!stop.load(Ordering::SeqCst), "stop should be false initially");

        stop.store(true, Ordering::SeqCst);
        let _ = handle.unwrap().await;
    }

    #[test]
    fn progress_message_starts_at_zero() {
        let stats = DownloadStats::new();
        assert_eq!(
            progress_message(&stats, 5),
            "[0/5] Downloading screenshots..."
        );
    }

    #[test]
    fn spinner_disabled_when_quiet_or_piped() {
        assert!(should_use_spinner(true, false));
        assert!(!should_use_spinner(true, true));
        assert!(!should_use_spinner(false, false));
    }
}
