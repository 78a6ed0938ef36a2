//! CLI entry point for the screenshot downloader.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

mod app;
mod cli;

use app::exit_handler::ProcessExit;
use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let outcome = match run(&args).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("{err:#}");
            ProcessExit::Failure
        }
    };
    ExitCode::from(outcome.code())
}

async fn run(args: &Args) -> Result<ProcessExit> {
    let profile = app::input_processor::resolve_profile(args.profile.as_deref())?;
    info!(%profile, "downloading screenshots");

    app::runtime::run(args, profile).await
}
