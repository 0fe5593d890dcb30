//! Administrative level descriptors and filter constraint builders.
//!
//! A [`LevelSpec`] captures everything that distinguishes one level's
//! processing from another's: the boundary file, where its area comes
//! from, and how many key segments its units carry. The per-level
//! lookup code collapses into data here.

use berlin_lor_geodata::{feature_area_sqm, feature_id};
use berlin_lor_models::{AdminLevel, LorKey, district_area_sqkm};
use berlin_lor_source::registry::GeometryVintage;
use geojson::Feature;

/// Where a level's unit area comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaSource {
    /// The hardcoded twelve-district km² table; district boundary files
    /// carry no usable area property.
    DistrictConstant,
    /// The normalized `area` property, in m².
    PropertySqm,
}

/// Static description of one administrative level.
#[derive(Debug, Clone, Copy)]
pub struct LevelSpec {
    /// The level this spec describes.
    pub level: AdminLevel,
    /// Boundary and output file stem.
    pub file_stem: &'static str,
    /// Where unit areas come from.
    pub area: AreaSource,
}

/// The four levels, coarse to fine, in processing order.
pub const LEVELS: [LevelSpec; 4] = [
    LevelSpec {
        level: AdminLevel::District,
        file_stem: "bezirksgrenzen",
        area: AreaSource::DistrictConstant,
    },
    LevelSpec {
        level: AdminLevel::ForecastArea,
        file_stem: "lor_prognoseraeume",
        area: AreaSource::PropertySqm,
    },
    LevelSpec {
        level: AdminLevel::DistrictRegion,
        file_stem: "lor_bezirksregionen",
        area: AreaSource::PropertySqm,
    },
    LevelSpec {
        level: AdminLevel::PlanningArea,
        file_stem: "lor_planungsraeume",
        area: AreaSource::PropertySqm,
    },
];

impl LevelSpec {
    /// Boundary file name for a geometry vintage. District boundaries
    /// were not redrawn for 2021, so a single file serves both.
    #[must_use]
    pub fn boundary_file(&self, vintage: GeometryVintage) -> String {
        match vintage {
            GeometryVintage::V2021 if self.level != AdminLevel::District => {
                format!("{}_2021.geojson", self.file_stem)
            }
            _ => format!("{}.geojson", self.file_stem),
        }
    }

    /// A feature's area in km², or `None` when unknown.
    #[must_use]
    pub fn area_sqkm(&self, feature: &Feature) -> Option<f64> {
        match self.area {
            AreaSource::DistrictConstant => {
                feature_id(feature).and_then(|id| district_area_sqkm(&id))
            }
            AreaSource::PropertySqm => feature_area_sqm(feature).map(|sqm| sqm / 1_000_000.0),
        }
    }
}

/// Builds the hierarchical key constraints for a unit of `level`.
///
/// District ids are bare 2-3 digit codes; every finer level decomposes
/// its 8-character compound key and constrains the first
/// `segment_count()` key columns. Returns `None` for ids that do not
/// parse into the expected shape.
#[must_use]
pub fn hierarchy_constraints(
    level: AdminLevel,
    unit_id: &str,
    key_columns: &[&str; 4],
) -> Option<Vec<(String, i64)>> {
    if level == AdminLevel::District {
        let district = unit_id.parse::<i64>().ok()?;
        return Some(vec![(key_columns[0].to_owned(), district)]);
    }

    let key = LorKey::decompose(unit_id)?;
    key.segments()[..level.segment_count()]
        .iter()
        .zip(key_columns)
        .map(|(segment, column)| {
            segment
                .parse::<i64>()
                .ok()
                .map(|value| ((*column).to_owned(), value))
        })
        .collect()
}

/// Builds the single combined-key constraint used by tables keyed on a
/// `nummer` column holding the whole unit id.
#[must_use]
pub fn combined_constraint(column: &str, unit_id: &str) -> Option<Vec<(String, i64)>> {
    let value = unit_id.parse::<i64>().ok()?;
    Some(vec![(column.to_owned(), value)])
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_COLUMNS: [&str; 4] = ["bezirk", "prognoseraum", "bezirksregion", "planungsraum"];

    #[test]
    fn district_constraint_uses_the_bare_id() {
        let constraints = hierarchy_constraints(AdminLevel::District, "01", &KEY_COLUMNS).unwrap();
        assert_eq!(constraints, vec![("bezirk".to_owned(), 1)]);

        let padded = hierarchy_constraints(AdminLevel::District, "001", &KEY_COLUMNS).unwrap();
        assert_eq!(padded, vec![("bezirk".to_owned(), 1)]);
    }

    #[test]
    fn finer_levels_constrain_a_key_prefix() {
        let constraints =
            hierarchy_constraints(AdminLevel::DistrictRegion, "01023004", &KEY_COLUMNS).unwrap();
        assert_eq!(
            constraints,
            vec![
                ("bezirk".to_owned(), 1),
                ("prognoseraum".to_owned(), 2),
                ("bezirksregion".to_owned(), 30),
            ]
        );
    }

    #[test]
    fn planning_areas_constrain_all_four_segments() {
        let constraints =
            hierarchy_constraints(AdminLevel::PlanningArea, "12345678", &KEY_COLUMNS).unwrap();
        assert_eq!(constraints.len(), 4);
        assert_eq!(constraints[3], ("planungsraum".to_owned(), 78));
    }

    #[test]
    fn malformed_ids_yield_no_constraints() {
        assert!(hierarchy_constraints(AdminLevel::PlanningArea, "0101", &KEY_COLUMNS).is_none());
        assert!(hierarchy_constraints(AdminLevel::District, "x1", &KEY_COLUMNS).is_none());
    }

    #[test]
    fn combined_constraint_parses_the_whole_id() {
        assert_eq!(
            combined_constraint("nummer", "010203").unwrap(),
            vec![("nummer".to_owned(), 10203)]
        );
        assert!(combined_constraint("nummer", "average").is_none());
    }

    #[test]
    fn boundary_files_follow_the_vintage() {
        let districts = &LEVELS[0];
        assert_eq!(
            districts.boundary_file(GeometryVintage::V2019),
            "bezirksgrenzen.geojson"
        );
        assert_eq!(
            districts.boundary_file(GeometryVintage::V2021),
            "bezirksgrenzen.geojson"
        );

        let planning = &LEVELS[3];
        assert_eq!(
            planning.boundary_file(GeometryVintage::V2019),
            "lor_planungsraeume.geojson"
        );
        assert_eq!(
            planning.boundary_file(GeometryVintage::V2021),
            "lor_planungsraeume_2021.geojson"
        );
    }
}
