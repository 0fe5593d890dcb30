#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the LOR statistics pipeline.

use clap::Parser;

use berlin_lor_cli_utils::IndicatifProgress;
use berlin_lor_pipeline::RunOptions;
use berlin_lor_source::progress::null_progress;

#[derive(Parser)]
#[command(
    name = "berlin_lor_cli",
    about = "Blend Berlin open-data statistics into LOR boundary files"
)]
struct Cli {
    /// Force regeneration of all downloads and outputs
    #[arg(long)]
    clean: bool,

    /// Suppress progress output
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let options = RunOptions {
        clean: cli.clean,
        quiet: cli.quiet,
    };

    let progress = if cli.quiet {
        pretty_env_logger::init();
        null_progress()
    } else {
        let multi = berlin_lor_cli_utils::init_logger();
        IndicatifProgress::stage_bar(&multi, "Starting pipeline")
    };

    berlin_lor_pipeline::run(&options, &progress).await?;

    Ok(())
}
