//! The per-feature blending walk shared by all key-figure groups.
//!
//! One routine handles every administrative level: build the unit's
//! filter constraints, select the matching rows of every table, apply
//! the missing-data contract, derive fields into the feature's property
//! map, and record the result in the aggregate map. Units without data
//! are skipped with a diagnostic — no placeholder records.

use std::collections::HashMap;
use std::path::Path;

use berlin_lor_aggregate::AggregateMap;
use berlin_lor_blend::{BlendSpec, blend_into};
use berlin_lor_geodata::{feature_id, read_feature_collection};
use berlin_lor_models::ReportingPeriod;
use berlin_lor_statistics::{FilteredRows, StatisticTable};
use geojson::FeatureCollection;

use crate::levels::LevelSpec;

/// Extends a copy of `collection` with fields derived from `tables`,
/// recording each blended unit's properties in `aggregates`.
///
/// `constraints_for` maps a unit id onto the table filter constraints
/// for this level; an id it cannot handle skips the unit. Units whose
/// filtered subsets fail the missing-data contract are skipped with a
/// diagnostic line naming the dataset and the unit.
#[allow(clippy::too_many_arguments)]
pub fn extend_level<F>(
    collection: &FeatureCollection,
    dataset_label: &str,
    level: &LevelSpec,
    tables: &[&StatisticTable],
    spec: &BlendSpec,
    constraints_for: F,
    aggregates: &mut AggregateMap,
    period: &ReportingPeriod,
) -> FeatureCollection
where
    F: Fn(&str) -> Option<Vec<(String, i64)>>,
{
    let mut extended = collection.clone();

    for feature in &mut extended.features {
        let Some(unit_id) = feature_id(feature) else {
            log::debug!("Feature without id in {} boundaries, skipping", level.level);
            continue;
        };
        let Some(constraints) = constraints_for(&unit_id) else {
            log::warn!(
                "Unusable unit id {unit_id} in {} boundaries, skipping",
                level.level
            );
            continue;
        };

        let filtered: Vec<FilteredRows<'_>> =
            tables.iter().map(|table| table.filter(&constraints)).collect();

        if !spec.has_data(&filtered) {
            log::info!(
                "No data in {dataset_label} for {}",
                describe_unit(&constraints)
            );
            continue;
        }

        let area_sqkm = level.area_sqkm(feature);
        let properties = feature.properties.get_or_insert_with(Default::default);
        blend_into(properties, area_sqkm, &filtered, spec);

        aggregates.insert(period, &unit_id, properties.clone());
    }

    extended
}

/// Renders a unit's key constraints for diagnostics, e.g.
/// `bezirk=1, prognoseraum=2`.
fn describe_unit(constraints: &[(String, i64)]) -> String {
    constraints
        .iter()
        .map(|(column, value)| format!("{column}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lazily loads prepared boundary collections, one per file name.
/// A file that cannot be loaded is logged once per attempt and skipped.
pub fn load_boundary<'a>(
    cache: &'a mut HashMap<String, FeatureCollection>,
    dir: &Path,
    file_name: &str,
) -> Option<&'a FeatureCollection> {
    if !cache.contains_key(file_name) {
        match read_feature_collection(&dir.join(file_name)) {
            Ok(collection) => {
                cache.insert(file_name.to_owned(), collection);
            }
            Err(e) => {
                log::warn!("Failed to load boundary file {file_name}: {e}");
                return None;
            }
        }
    }
    cache.get(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LEVELS, hierarchy_constraints};
    use berlin_lor_blend::population;
    use berlin_lor_models::AdminLevel;
    use geojson::GeoJson;

    fn period() -> ReportingPeriod {
        ReportingPeriod {
            year: "2021".to_owned(),
            half_year: "01".to_owned(),
        }
    }

    fn table(name: &str, csv: &str) -> StatisticTable {
        StatisticTable::from_reader(name.to_owned(), csv.as_bytes()).unwrap()
    }

    fn district_boundaries(id: &str) -> FeatureCollection {
        let json = format!(
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature",
                "properties":{{"id":"{id}","name":"Mitte"}},
                "geometry":{{"type":"Polygon","coordinates":[[[13.1,52.3],[13.5,52.3],[13.5,52.6],[13.1,52.3]]]}}}}]}}"#
        );
        FeatureCollection::try_from(json.parse::<GeoJson>().unwrap()).unwrap()
    }

    fn population_tables() -> [StatisticTable; 4] {
        [
            table(
                "t1",
                "bezirk,insgesamt_anzahl,darunter_mit_migrationshintergrund_anzahl\n1,100,20\n",
            ),
            table("t2", "bezirk,weiblich\n1,50\n"),
            table("t3", "bezirk,weiblich\n1,10\n"),
            table("t4", "bezirk,polen\n1,5\n"),
        ]
    }

    fn run_districts(
        boundaries: &FeatureCollection,
        tables: &[&StatisticTable],
        aggregates: &mut AggregateMap,
    ) -> FeatureCollection {
        extend_level(
            boundaries,
            "SB_A01-16-00_2021h01_BE",
            &LEVELS[0],
            tables,
            &population::spec(),
            |id| hierarchy_constraints(AdminLevel::District, id, &population::KEY_COLUMNS),
            aggregates,
            &period(),
        )
    }

    #[test]
    fn blends_a_district_end_to_end() {
        let tables = population_tables();
        let table_refs: Vec<&StatisticTable> = tables.iter().collect();
        let mut aggregates = AggregateMap::new();

        let extended = run_districts(&district_boundaries("001"), &table_refs, &mut aggregates);

        let properties = extended.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["inhabitants"], 100.0);
        assert_eq!(properties["inhabitants_percentage"], 100.0);
        assert_eq!(properties["inhabitants_per_sqkm"], 3);
        assert_eq!(properties["inhabitants_with_migration_background"], 20.0);
        assert_eq!(
            properties["inhabitants_with_migration_background_percentage"],
            20.0
        );
        assert_eq!(properties["inhabitants_female"], 50.0);
        assert_eq!(properties["inhabitants_from_poland"], 5.0);

        // The aggregate record mirrors the feature's property map.
        let record = aggregates.get(&period(), "001").unwrap();
        assert_eq!(record["inhabitants"], 100.0);
        assert_eq!(record["name"], "Mitte");
    }

    #[test]
    fn unit_without_rows_is_skipped_entirely() {
        let tables = population_tables();
        let table_refs: Vec<&StatisticTable> = tables.iter().collect();
        let mut aggregates = AggregateMap::new();

        let extended = run_districts(&district_boundaries("002"), &table_refs, &mut aggregates);

        let properties = extended.features[0].properties.as_ref().unwrap();
        assert!(!properties.contains_key("inhabitants"));
        assert!(!aggregates.contains(&period(), "002"));
    }

    #[test]
    fn unknown_district_blends_without_density() {
        let boundaries = district_boundaries("13");
        let tables = [
            table(
                "t1",
                "bezirk,insgesamt_anzahl,darunter_mit_migrationshintergrund_anzahl\n13,100,20\n",
            ),
            table("t2", "bezirk,weiblich\n13,50\n"),
            table("t3", "bezirk,weiblich\n13,10\n"),
            table("t4", "bezirk,polen\n13,5\n"),
        ];
        let table_refs: Vec<&StatisticTable> = tables.iter().collect();
        let mut aggregates = AggregateMap::new();

        let extended = run_districts(&boundaries, &table_refs, &mut aggregates);

        let properties = extended.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["inhabitants"], 100.0);
        assert!(properties.keys().all(|k| !k.ends_with("_per_sqkm")));
    }

    #[test]
    fn repeated_runs_derive_identical_output() {
        let tables = population_tables();
        let table_refs: Vec<&StatisticTable> = tables.iter().collect();
        let boundaries = district_boundaries("001");

        let mut first_aggregates = AggregateMap::new();
        let first = run_districts(&boundaries, &table_refs, &mut first_aggregates);
        let mut second_aggregates = AggregateMap::new();
        let second = run_districts(&boundaries, &table_refs, &mut second_aggregates);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&first_aggregates).unwrap(),
            serde_json::to_string(&second_aggregates).unwrap()
        );
    }
}
