#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset descriptors and open-data downloads.
//!
//! Which reporting periods exist, which table files belong to them, and
//! which schema generation they follow is configuration, not code: the
//! [`registry`] parses embedded TOML documents into descriptor structs
//! that the pipeline iterates. The [`download`] module fetches boundary
//! files from the open-data portal; a failed download is logged and
//! skipped, never fatal.

pub mod download;
pub mod progress;
pub mod registry;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
