#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Core types for Berlin's LOR spatial-planning unit system.
//!
//! LOR ("Lebensweltlich orientierte Räume") keys are compound codes: an
//! 8-character planning-area key concatenates four 2-character segments,
//! one per administrative level from coarse to fine. [`LorKey`] decomposes
//! such a key; [`AdminLevel`] names the four levels; the district area
//! table provides the hardcoded km² figures used when a boundary file
//! carries no area of its own.

use serde::Deserialize;
use strum_macros::Display;

/// The four administrative levels of the LOR hierarchy, coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AdminLevel {
    /// Bezirk — one of Berlin's twelve districts.
    District,
    /// Prognoseraum — forecast area.
    ForecastArea,
    /// Bezirksregion — district region.
    DistrictRegion,
    /// Planungsraum — planning area, the finest level.
    PlanningArea,
}

impl AdminLevel {
    /// Number of 2-character key segments that identify a unit of this
    /// level (1 for districts up to 4 for planning areas).
    #[must_use]
    pub const fn segment_count(self) -> usize {
        match self {
            Self::District => 1,
            Self::ForecastArea => 2,
            Self::DistrictRegion => 3,
            Self::PlanningArea => 4,
        }
    }
}

/// A decomposed compound LOR key.
///
/// Wraps the original 8-character key and exposes its four 2-character
/// segments. No validation is performed on character content; segments are
/// converted to integers only at filter time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LorKey {
    combined: String,
}

impl LorKey {
    /// Splits an 8-character compound key into its segments.
    ///
    /// Returns `None` when the key is not exactly 8 characters long (e.g.
    /// a bare 2-digit district id, which has no hierarchy to decompose).
    #[must_use]
    pub fn decompose(combined: &str) -> Option<Self> {
        if combined.len() == 8 && combined.is_ascii() {
            Some(Self {
                combined: combined.to_owned(),
            })
        } else {
            None
        }
    }

    /// The original compound key, the concatenation of all four segments.
    #[must_use]
    pub fn combined(&self) -> &str {
        &self.combined
    }

    /// District segment (characters 0..2).
    #[must_use]
    pub fn district(&self) -> &str {
        &self.combined[0..2]
    }

    /// Forecast-area segment (characters 2..4).
    #[must_use]
    pub fn forecast_area(&self) -> &str {
        &self.combined[2..4]
    }

    /// District-region segment (characters 4..6).
    #[must_use]
    pub fn district_region(&self) -> &str {
        &self.combined[4..6]
    }

    /// Planning-area segment (characters 6..8).
    #[must_use]
    pub fn planning_area(&self) -> &str {
        &self.combined[6..8]
    }

    /// All four segments, coarse to fine.
    #[must_use]
    pub fn segments(&self) -> [&str; 4] {
        [
            self.district(),
            self.forecast_area(),
            self.district_region(),
            self.planning_area(),
        ]
    }
}

/// A reporting period: a (year, half-year) snapshot identifier.
///
/// Both parts are kept as strings since they serve as JSON object keys in
/// the aggregate output ("2021" / "01"; "00" marks yearly reports).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportingPeriod {
    /// Four-digit year, e.g. "2021".
    pub year: String,
    /// Two-digit half-year, "01" or "02" ("00" for yearly reports).
    pub half_year: String,
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h{}", self.year, self.half_year)
    }
}

/// Areas of the twelve districts in km², keyed by 2-digit district id.
///
/// District boundary files carry no usable area property, so these figures
/// stand in for them during density derivation.
const DISTRICT_AREAS_SQKM: [(&str, f64); 12] = [
    ("01", 39.34),
    ("02", 20.36),
    ("03", 103.10),
    ("04", 59.76),
    ("05", 91.74),
    ("06", 102.40),
    ("07", 52.93),
    ("08", 44.89),
    ("09", 167.41),
    ("10", 61.77),
    ("11", 52.02),
    ("12", 89.19),
];

/// Looks up a district's area in km² by its id.
///
/// The comparison is structural, not numeric: both the 2-digit ("01") and
/// the zero-padded 3-digit ("001") spelling found in boundary files match.
#[must_use]
pub fn district_area_sqkm(district_id: &str) -> Option<f64> {
    let id = match district_id.len() {
        3 if district_id.starts_with('0') => &district_id[1..],
        _ => district_id,
    };

    DISTRICT_AREAS_SQKM
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, area)| *area)
}
