#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Batch pipeline for blending LOR statistics into boundary files.
//!
//! Four stages run in order: download boundary files, prepare them
//! (normalize property keys, clean geometries, compute bounding boxes),
//! blend the population statistics, blend the social monitoring
//! statistics. Each unit of each reporting period is processed
//! independently: decompose its key, filter the period's tables, derive
//! fields, record the result. Failures stay local — a missing table or
//! boundary file is logged and skipped, never fatal to the run.
//!
//! Outputs are only written when absent or when `clean` forces
//! regeneration, so an interrupted run resumes where it left off and an
//! unchanged rerun rewrites nothing.

pub mod blender;
pub mod download;
pub mod levels;
pub mod population;
pub mod prepare;
pub mod social;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use berlin_lor_source::progress::ProgressCallback;

/// Errors that can occur during pipeline execution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Statistic table loading failed.
    #[error("statistics error: {0}")]
    Statistics(#[from] berlin_lor_statistics::StatisticsError),

    /// Boundary file handling failed.
    #[error("geodata error: {0}")]
    Geo(#[from] berlin_lor_geodata::GeoError),

    /// Aggregate writing failed.
    #[error("aggregate error: {0}")]
    Aggregate(#[from] berlin_lor_aggregate::AggregateError),

    /// Download failed.
    #[error("source error: {0}")]
    Source(#[from] berlin_lor_source::SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run-wide options, matching the CLI surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Force regeneration of all downloads and outputs.
    pub clean: bool,
    /// Suppress per-file progress logging.
    pub quiet: bool,
}

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR` so output paths are
/// independent of the caller's working directory.
///
/// # Panics
///
/// Panics if the project root cannot be resolved from
/// `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn workspace_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Directory holding prepared boundary files and all outputs.
#[must_use]
pub fn data_dir() -> PathBuf {
    workspace_dir().join("data")
}

/// Directory holding downloaded raw inputs.
#[must_use]
pub fn raw_dir() -> PathBuf {
    workspace_dir().join("raw")
}

/// Runs the full pipeline.
///
/// # Errors
///
/// Returns [`PipelineError`] only for failures that leave the run unable
/// to continue (e.g. the output directory cannot be created). Per-file
/// and per-dataset failures are logged and skipped.
pub async fn run(
    options: &RunOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), PipelineError> {
    download::run(options, progress).await?;
    prepare::run(options)?;
    population::run(options, progress)?;
    social::run(options, progress)?;
    progress.finish("Pipeline complete".to_owned());
    Ok(())
}
