//! Download stage: boundary files from the open-data portal.
//!
//! Statistic CSV exports are expected under `raw/` already (they are
//! produced by a separate spreadsheet export); only the boundary
//! GeoJSON files are fetched here. Failures are logged and skipped.

use std::sync::Arc;

use berlin_lor_source::SourceError;
use berlin_lor_source::download::{Download, download_all};
use berlin_lor_source::progress::ProgressCallback;
use berlin_lor_source::registry;

use crate::{PipelineError, RunOptions, raw_dir};

/// Fetches all boundary files into `raw/lor-geodata`.
///
/// # Errors
///
/// Returns [`PipelineError`] only if the HTTP client cannot be built;
/// individual download failures are logged and skipped.
pub async fn run(
    options: &RunOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), PipelineError> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(SourceError::from)?;

    let geodata_dir = raw_dir().join("lor-geodata");
    let downloads: Vec<Download> = registry::boundaries()
        .into_iter()
        .map(|file| Download {
            url: file.url,
            dest: geodata_dir.join(&file.name),
        })
        .collect();

    progress.set_message("Downloading boundary files".to_owned());
    let fetched = download_all(&client, &downloads, options.clean, progress).await;

    if !options.quiet {
        log::info!("Fetched {fetched} of {} boundary files", downloads.len());
    }
    Ok(())
}
