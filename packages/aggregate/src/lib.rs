#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Aggregate result maps: year -> half-year -> unit id -> properties.
//!
//! Built incrementally across all reporting periods and administrative
//! levels of a run, then serialized once. `BTreeMap` keys keep the JSON
//! output deterministic so repeated runs are byte-identical. A later
//! write for the same (year, half-year, unit) replaces the earlier one.

use std::collections::BTreeMap;
use std::path::Path;

use berlin_lor_models::ReportingPeriod;
use serde::Serialize;

/// A unit's property map as stored in the aggregate output.
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur while writing aggregate files.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// I/O error (file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pseudo-unit keys carrying per-period summary statistics. Real unit ids
/// are numeric strings and can never collide, but the insert path still
/// refuses them to keep the namespace conflation harmless.
pub const RESERVED_KEYS: [&str; 2] = ["average", "median"];

/// The nested aggregate structure for one level of one key-figure group.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct AggregateMap {
    map: BTreeMap<String, BTreeMap<String, BTreeMap<String, PropertyMap>>>,
}

impl AggregateMap {
    /// Creates an empty aggregate map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a unit's properties for a reporting period, replacing any
    /// earlier record for the same unit and period.
    ///
    /// Returns `false` (and logs) when `unit_id` is a reserved summary
    /// key, which would corrupt the per-period namespace.
    pub fn insert(
        &mut self,
        period: &ReportingPeriod,
        unit_id: &str,
        properties: PropertyMap,
    ) -> bool {
        if RESERVED_KEYS.contains(&unit_id) {
            log::warn!("Refusing to record unit with reserved id {unit_id} for {period}");
            return false;
        }

        self.map
            .entry(period.year.clone())
            .or_default()
            .entry(period.half_year.clone())
            .or_default()
            .insert(unit_id.to_owned(), properties);
        true
    }

    /// Whether a unit has a record for a period.
    #[must_use]
    pub fn contains(&self, period: &ReportingPeriod, unit_id: &str) -> bool {
        self.get(period, unit_id).is_some()
    }

    /// Looks up a unit's record for a period.
    #[must_use]
    pub fn get(&self, period: &ReportingPeriod, unit_id: &str) -> Option<&PropertyMap> {
        self.map
            .get(&period.year)?
            .get(&period.half_year)?
            .get(unit_id)
    }

    /// Whether the map holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Adds `"average"` and `"median"` pseudo-units to every per-period
    /// cell, summarizing each numeric field across that cell's units.
    pub fn append_summaries(&mut self) {
        for half_years in self.map.values_mut() {
            for units in half_years.values_mut() {
                let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
                for (unit_id, properties) in units.iter() {
                    if RESERVED_KEYS.contains(&unit_id.as_str()) {
                        continue;
                    }
                    for (field, value) in properties {
                        if let Some(number) = value.as_f64() {
                            samples.entry(field.clone()).or_default().push(number);
                        }
                    }
                }

                let mut averages = PropertyMap::new();
                let mut medians = PropertyMap::new();
                for (field, mut values) in samples {
                    averages.insert(field.clone(), mean(&values).into());
                    values.sort_by(f64::total_cmp);
                    medians.insert(field, median_of_sorted(&values).into());
                }

                units.insert("average".to_owned(), averages);
                units.insert("median".to_owned(), medians);
            }
        }
    }

    /// Serializes the map to `path` unless the file already exists and
    /// `clean` is not set. Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError`] if serialization or the write fails.
    pub fn write_json(&self, path: &Path, clean: bool) -> Result<bool, AggregateError> {
        if path.exists() && !clean {
            log::debug!("{} already exists, skipping", path.display());
            return Ok(false);
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(true)
    }
}

/// Arithmetic mean, rounded to two decimals.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    round2(values.iter().sum::<f64>() / count)
}

/// Median of an already-sorted slice, rounded to two decimals.
#[must_use]
pub fn median_of_sorted(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        f64::midpoint(values[mid - 1], values[mid])
    } else {
        values[mid]
    };
    round2(median)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(year: &str, half: &str) -> ReportingPeriod {
        ReportingPeriod {
            year: year.to_owned(),
            half_year: half.to_owned(),
        }
    }

    fn props(pairs: &[(&str, f64)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::from(*v)))
            .collect()
    }

    #[test]
    fn insert_builds_nested_structure() {
        let mut map = AggregateMap::new();
        assert!(map.insert(&period("2021", "01"), "01", props(&[("inhabitants", 100.0)])));

        let record = map.get(&period("2021", "01"), "01").unwrap();
        assert_eq!(record["inhabitants"], 100.0);
        assert!(map.get(&period("2021", "02"), "01").is_none());
    }

    #[test]
    fn later_insert_replaces_earlier_record() {
        let mut map = AggregateMap::new();
        map.insert(&period("2021", "01"), "01", props(&[("inhabitants", 100.0)]));
        map.insert(&period("2021", "01"), "01", props(&[("inhabitants", 150.0)]));

        let record = map.get(&period("2021", "01"), "01").unwrap();
        assert_eq!(record["inhabitants"], 150.0);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn reserved_unit_ids_are_refused() {
        let mut map = AggregateMap::new();
        assert!(!map.insert(&period("2021", "01"), "average", PropertyMap::new()));
        assert!(map.is_empty());
    }

    #[test]
    fn summaries_cover_every_numeric_field() {
        let mut map = AggregateMap::new();
        let p = period("2021", "01");
        map.insert(&p, "01", props(&[("inhabitants", 100.0)]));
        map.insert(&p, "02", props(&[("inhabitants", 200.0)]));
        map.insert(&p, "03", props(&[("inhabitants", 600.0)]));
        map.append_summaries();

        assert_eq!(map.get(&p, "average").unwrap()["inhabitants"], 300.0);
        assert_eq!(map.get(&p, "median").unwrap()["inhabitants"], 200.0);
    }

    #[test]
    fn median_of_even_count_averages_the_middle() {
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[1.0, 2.0]), 1.5);
    }

    #[test]
    fn serializes_years_before_units() {
        let mut map = AggregateMap::new();
        map.insert(&period("2021", "01"), "0101", props(&[("inhabitants", 1.0)]));

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2021":{"01":{"0101":{"inhabitants":1.0}}}}"#);
    }
}
