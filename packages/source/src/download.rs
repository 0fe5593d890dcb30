//! HTTPS downloads from the open-data portal.
//!
//! No retry policy and no timeouts: a failed download is logged and the
//! run continues with whatever files already exist locally. Existing
//! files are kept as-is unless a clean run forces re-download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::SourceError;
use crate::progress::ProgressCallback;

/// One file to fetch.
#[derive(Debug, Clone)]
pub struct Download {
    /// Source URL.
    pub url: String,
    /// Destination path.
    pub dest: PathBuf,
}

/// Downloads a single file to `dest`, skipping the request entirely when
/// the file exists and `clean` is not set. Returns whether a download
/// happened.
///
/// # Errors
///
/// Returns [`SourceError`] if the request or the file write fails.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    clean: bool,
) -> Result<bool, SourceError> {
    if dest.exists() && !clean {
        log::debug!("{} already exists, skipping download", dest.display());
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    std::fs::write(dest, &bytes)?;

    log::debug!("Downloaded {} bytes from {url}", bytes.len());
    Ok(true)
}

/// Downloads a batch of files, treating every failure as non-fatal.
/// Returns the number of files actually fetched.
pub async fn download_all(
    client: &reqwest::Client,
    downloads: &[Download],
    clean: bool,
    progress: &Arc<dyn ProgressCallback>,
) -> usize {
    progress.set_total(downloads.len() as u64);

    let mut fetched = 0;
    for download in downloads {
        progress.set_message(format!("Downloading {}", download.url));
        match download_file(client, &download.url, &download.dest, clean).await {
            Ok(true) => fetched += 1,
            Ok(false) => {}
            Err(e) => log::warn!("Failed to download {}: {e}", download.url),
        }
        progress.inc(1);
    }

    fetched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;

    #[tokio::test]
    async fn existing_files_are_not_re_downloaded() {
        let dir = std::env::temp_dir().join(format!("lor-download-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dest = dir.join("bezirksgrenzen.geojson");
        std::fs::write(&dest, "{}").unwrap();

        // The URL is unresolvable; reaching the network would fail loudly.
        let client = reqwest::Client::new();
        let downloaded = download_file(
            &client,
            "https://invalid.localdomain/bezirksgrenzen.geojson",
            &dest,
            false,
        )
        .await
        .unwrap();

        assert!(!downloaded);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn failed_downloads_are_non_fatal() {
        let dir = std::env::temp_dir().join(format!("lor-download-fail-{}", std::process::id()));
        let client = reqwest::Client::new();
        let downloads = [Download {
            url: "https://invalid.localdomain/missing.geojson".to_owned(),
            dest: dir.join("missing.geojson"),
        }];

        let fetched = download_all(&client, &downloads, false, &null_progress()).await;

        assert_eq!(fetched, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
