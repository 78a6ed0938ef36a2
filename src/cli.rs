//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use screenshot_downloader::site::{DEFAULT_ASSET_HOST, DEFAULT_COMMUNITY_BASE};
use screenshot_downloader::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};

/// Download every screenshot from a Steam community profile.
///
/// Pass the profile's 64-bit id (a long number usually starting with 7656...),
/// pipe it on stdin, or run without arguments to be asked for it.
#[derive(Parser, Debug)]
#[command(name = "screenshot-downloader")]
#[command(author, version, about)]
#[command(after_help = "Exit codes:\n  0 = all screenshots downloaded (or none found)\n  1 = partial success\n  2 = every download failed or fatal error")]
pub struct Args {
    /// 64-bit profile id, e.g. 76561197960279927
    #[arg(value_name = "PROFILE_ID")]
    pub profile: Option<String>,

    /// Directory the Screenshots<PROFILE_ID> folder is created in
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Maximum attempts per screenshot (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Community site origin
    #[arg(long, hide = true, default_value = DEFAULT_COMMUNITY_BASE)]
    pub community_url: String,

    /// Image host origin
    #[arg(long, hide = true, default_value = DEFAULT_ASSET_HOST)]
    pub asset_host: String,
}

impl Args {
    /// Log level used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
