#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `GeoJSON` boundary file handling.
//!
//! Boundary files from the open data portal arrive with source-specific
//! property keys and occasional multi-part geometries. This crate loads
//! them, normalizes the identifier/name/area keys the blending stage
//! expects, reduces multi-part geometries to their largest part, computes
//! bounding boxes, and writes collections back out idempotently.

use std::path::Path;

use geo::BoundingRect;
use geojson::{Feature, FeatureCollection, GeoJson};

/// Errors that can occur during boundary file operations.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source-specific spellings of the unit identifier property.
const ID_ALIASES: [&str; 7] = [
    "id",
    "spatial_name",
    "PLR_ID",
    "BZR_ID",
    "PGR_ID",
    "Gemeinde_schluessel",
    "SCHLUESSEL",
];

/// Source-specific spellings of the unit name property.
const NAME_ALIASES: [&str; 7] = [
    "name",
    "spatial_alias",
    "PLR_NAME",
    "BZR_NAME",
    "PGR_NAME",
    "Gemeinde_name",
    "BEZNAME",
];

/// Source-specific spellings of the area-in-m² property.
const AREA_ALIASES: [&str; 5] = [
    "area",
    "GROESSE_M2",
    "GROESSE_m2",
    "SHAPE_Area",
    "Shape__Area",
];

/// Reads a `FeatureCollection` from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or parsed.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection, GeoError> {
    let content = std::fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    Ok(FeatureCollection::try_from(geojson)?)
}

/// Writes a `FeatureCollection` to `path` unless the file already exists
/// and `clean` is not set. Returns whether the file was written.
///
/// # Errors
///
/// Returns [`GeoError`] if serialization or the write fails.
pub fn write_feature_collection(
    path: &Path,
    collection: &FeatureCollection,
    clean: bool,
) -> Result<bool, GeoError> {
    if path.exists() && !clean {
        log::debug!("{} already exists, skipping", path.display());
        return Ok(false);
    }

    let tmp = path.with_extension("geojson.tmp");
    std::fs::write(&tmp, serde_json::to_string(collection)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(true)
}

/// Renames source-specific id/name/area property keys onto the canonical
/// `id` / `name` / `area` spelling, coercing numeric ids to strings.
pub fn normalize_properties(collection: &mut FeatureCollection) {
    for feature in &mut collection.features {
        let Some(properties) = feature.properties.as_mut() else {
            continue;
        };

        for (canonical, aliases) in [
            ("id", ID_ALIASES.as_slice()),
            ("name", NAME_ALIASES.as_slice()),
            ("area", AREA_ALIASES.as_slice()),
        ] {
            if properties.contains_key(canonical) {
                continue;
            }
            if let Some(alias) = aliases.iter().find(|a| properties.contains_key(**a))
                && let Some(value) = properties.remove(*alias)
            {
                properties.insert(canonical.to_owned(), value);
            }
        }

        // Identifier comparison downstream is string-structural.
        if let Some(id) = properties.get("id")
            && !id.is_string()
        {
            let id = id.to_string();
            properties.insert("id".to_owned(), id.into());
        }
    }
}

/// Reduces every multi-part geometry to its largest part, measured by
/// exterior ring length. Returns whether anything changed.
pub fn clean_geometry(collection: &mut FeatureCollection) -> bool {
    let mut changed = false;

    for feature in &mut collection.features {
        let Some(geometry) = feature.geometry.as_mut() else {
            continue;
        };
        let largest = match &geometry.value {
            geojson::Value::MultiPolygon(polygons) if polygons.len() > 1 => polygons
                .iter()
                .max_by_key(|polygon| polygon.first().map_or(0, Vec::len))
                .cloned(),
            _ => None,
        };
        if let Some(largest) = largest {
            geometry.value = geojson::Value::Polygon(largest);
            changed = true;
        }
    }

    changed
}

/// Computes per-feature and collection bounding boxes from the geometries.
pub fn compute_bbox(collection: &mut FeatureCollection) {
    let mut collection_bbox: Option<[f64; 4]> = None;

    for feature in &mut collection.features {
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let Ok(shape) = geo::Geometry::<f64>::try_from(geometry.value.clone()) else {
            log::warn!("Unsupported geometry in feature {:?}", feature.id);
            continue;
        };
        let Some(rect) = shape.bounding_rect() else {
            continue;
        };

        let bbox = [rect.min().x, rect.min().y, rect.max().x, rect.max().y];
        feature.bbox = Some(bbox.to_vec());

        collection_bbox = Some(collection_bbox.map_or(bbox, |acc| {
            [
                acc[0].min(bbox[0]),
                acc[1].min(bbox[1]),
                acc[2].max(bbox[2]),
                acc[3].max(bbox[3]),
            ]
        }));
    }

    collection.bbox = collection_bbox.map(|bbox| bbox.to_vec());
}

/// The normalized unit identifier of a feature.
#[must_use]
pub fn feature_id(feature: &Feature) -> Option<String> {
    let value = feature.properties.as_ref()?.get("id")?;
    match value {
        serde_json::Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

/// The normalized area of a feature in m².
#[must_use]
pub fn feature_area_sqm(feature: &Feature) -> Option<f64> {
    feature.properties.as_ref()?.get("area")?.as_f64()
}
