//! Preparation stage: raw boundary files into blendable ones.
//!
//! Normalizes the source-specific id/name/area property keys, reduces
//! multi-part geometries to their largest part, computes bounding boxes,
//! and writes the result into the data directory. A boundary file that
//! is missing or unreadable is logged and skipped.

use berlin_lor_geodata::{
    clean_geometry, compute_bbox, normalize_properties, read_feature_collection,
    write_feature_collection,
};
use berlin_lor_source::registry;

use crate::{PipelineError, RunOptions, data_dir, raw_dir};

/// Prepares all downloaded boundary files.
///
/// # Errors
///
/// Returns [`PipelineError`] if the data directory cannot be created or
/// a prepared file cannot be written; unreadable inputs are skipped.
pub fn run(options: &RunOptions) -> Result<(), PipelineError> {
    let geodata_dir = raw_dir().join("lor-geodata");
    let data = data_dir();
    std::fs::create_dir_all(&data)?;

    for file in registry::boundaries() {
        let source = geodata_dir.join(&file.name);
        if !source.exists() {
            log::warn!("Boundary file {} not downloaded, skipping", file.name);
            continue;
        }

        let mut collection = match read_feature_collection(&source) {
            Ok(collection) => collection,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", file.name);
                continue;
            }
        };

        normalize_properties(&mut collection);
        if clean_geometry(&mut collection) {
            log::debug!("Reduced multi-part geometries in {}", file.name);
        }
        compute_bbox(&mut collection);

        let written = write_feature_collection(&data.join(&file.name), &collection, options.clean)?;
        if written && !options.quiet {
            log::info!("Prepared {}", file.name);
        }
    }

    Ok(())
}
