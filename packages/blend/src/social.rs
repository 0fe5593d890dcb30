//! Mapping tables for the social urban development monitoring group.
//!
//! Tables are keyed by a single combined `nummer` column per level rather
//! than the hierarchical key columns, and all indicators except the
//! inhabitant count are shares or index values copied as-is (no
//! percentage/density derivation). The table layout shifted in 2021:
//! three context indicators moved into supplementary tables.

use berlin_lor_models::AdminLevel;

use crate::{BlendField, BlendSpec, modifier, plain};

/// Key column of all social monitoring tables.
pub const KEY_COLUMN: &str = "nummer";

/// Table layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialSchema {
    /// Reports up to and including 2019: one context table per level.
    Pre2020,
    /// Reports from 2021 on: k08/k14/k15 live in a supplementary context
    /// table per level.
    Post2020,
}

/// Status/dynamics index fields of the SDI table (planning areas only).
fn sdi_fields(table: usize) -> Vec<BlendField> {
    vec![
        plain("status_index", table, "status_index"),
        plain("dynamics_index", table, "dynamik_index"),
    ]
}

/// Share indicators of an index-indicator table.
fn index_fields(table: usize) -> Vec<BlendField> {
    vec![
        plain("s1_percentage_unemployed", table, "s1_anteil_arbeitslose"),
        plain(
            "s2_percentage_long_term_unemployed",
            table,
            "s2_anteil_langzeitarbeitslose",
        ),
        plain(
            "s3_percentage_transfer_payments_recipients",
            table,
            "s3_anteil_transferbezieher",
        ),
        plain(
            "s4_percentage_transfer_payments_recipients_below_15_years",
            table,
            "s4_anteil_transferbezieher_unter_15",
        ),
        plain("d1_percentage_unemployed", table, "d1_anteil_arbeitslose"),
        plain(
            "d2_percentage_long_term_unemployed",
            table,
            "d2_anteil_langzeitarbeitslose",
        ),
        plain(
            "d3_percentage_transfer_payments_recipients",
            table,
            "d3_anteil_transferbezieher",
        ),
        plain(
            "d4_percentage_transfer_payments_recipients_below_15_years",
            table,
            "d4_anteil_transferbezieher_unter_15",
        ),
    ]
}

/// Z-score variants of the index indicators (planning areas only).
fn z_fields(table: usize) -> Vec<BlendField> {
    vec![
        plain(
            "z_s1_percentage_unemployed",
            table,
            "z_s1_anteil_arbeitslose",
        ),
        plain(
            "z_s2_percentage_long_term_unemployed",
            table,
            "z_s2_anteil_langzeitarbeitslose",
        ),
        plain(
            "z_s3_percentage_transfer_payments_recipients",
            table,
            "z_s3_anteil_transferbezieher",
        ),
        plain(
            "z_s4_percentage_transfer_payments_recipients_below_15_years",
            table,
            "z_s4_anteil_transferbezieher_unter_15",
        ),
        plain(
            "z_d1_percentage_unemployed",
            table,
            "z_d1_anteil_arbeitslose",
        ),
        plain(
            "z_d2_percentage_long_term_unemployed",
            table,
            "z_d2_anteil_langzeitarbeitslose",
        ),
        plain(
            "z_d3_percentage_transfer_payments_recipients",
            table,
            "z_d3_anteil_transferbezieher",
        ),
        plain(
            "z_d4_percentage_transfer_payments_recipients_below_15_years",
            table,
            "z_d4_anteil_transferbezieher_unter_15",
        ),
    ]
}

/// Context indicators. `context` holds the main table, `supplement` the
/// table carrying k08/k14/k15 (the same table before 2021).
fn context_fields(context: usize, supplement: usize) -> Vec<BlendField> {
    vec![
        plain(
            "k01_youth_unemployment",
            context,
            "k01_jugendarbeitslosigkeit",
        ),
        plain(
            "k02_single_parent_households",
            context,
            "k02_alleinerziehende_haushalte",
        ),
        plain("k03_old_age_poverty", context, "k03_altersarmut"),
        plain(
            "k04_children_with_migration_background",
            context,
            "k04_kinder_und_jugendliche_mit_migrationshintergrund",
        ),
        plain(
            "k05_inhabitants_with_migration_background",
            context,
            "k05_einwohnerinnen_und_einwohner_mit_migrationshintergrund",
        ),
        plain(
            "k16_foreigners",
            context,
            "k16_auslaenderinnen_und_auslaender",
        ),
        plain(
            "k06_change_proportion_of_foreigner",
            context,
            "k06_veraenderung_auslaenderanteil",
        ),
        plain(
            "k17_non_eu_foreigners",
            context,
            "k17_nicht_eu_auslaenderinnen_und_auslaender",
        ),
        plain(
            "k07_foreign_transfer_recipients",
            context,
            "k07_auslaendische_transferbezieher",
        ),
        plain(
            "k08_urban_apartments",
            supplement,
            "k08_staedtische_wohnungen",
        ),
        plain("k14_living_rooms", supplement, "k14_wohnraeume"),
        plain("k15_living_space", supplement, "k15_wohnflaeche"),
        plain(
            "k09_simple_residential_area",
            context,
            "k09_einfache_wohnlage",
        ),
        plain(
            "k10_duration_of_residence_over_5_years",
            context,
            "k10_wohndauer_ueber_5_jahre",
        ),
        plain("k11_migration_volume", context, "k11_wanderungsvolumen"),
        plain("k12_balance_of_migration", context, "k12_wanderungssaldo"),
        plain(
            "k13_balance_of_migration_of_children_below_6",
            context,
            "k13_wanderungssaldo_von_kindern_unter_6_jahren",
        ),
    ]
}

/// Builds the blend spec for one level and schema generation.
///
/// The table slice handed to [`crate::blend_into`] must follow the layout
/// produced by [`table_count`]: districts and district regions get
/// `[index, context(, context supplement)]`, planning areas get
/// `[sdi, index, z, context(, context supplement)]`. Forecast areas have
/// no social monitoring tables.
///
/// Returns `None` for [`AdminLevel::ForecastArea`].
#[must_use]
pub fn spec_for(level: AdminLevel, schema: SocialSchema) -> Option<BlendSpec> {
    let mut fields;
    let reference_table;

    match level {
        AdminLevel::ForecastArea => return None,
        AdminLevel::District | AdminLevel::DistrictRegion => {
            let supplement = match schema {
                SocialSchema::Pre2020 => 1,
                SocialSchema::Post2020 => 2,
            };
            fields = vec![modifier("inhabitants", 0, "einwohner")];
            fields.extend(index_fields(0));
            fields.extend(context_fields(1, supplement));
            reference_table = 0;
        }
        AdminLevel::PlanningArea => {
            let supplement = match schema {
                SocialSchema::Pre2020 => 3,
                SocialSchema::Post2020 => 4,
            };
            fields = vec![modifier("inhabitants", 1, "einwohner")];
            fields.extend(sdi_fields(0));
            fields.extend(index_fields(1));
            fields.extend(z_fields(2));
            fields.extend(context_fields(3, supplement));
            reference_table = 1;
        }
    }

    Some(BlendSpec {
        fields,
        // Shares are already percentages in the source; only the
        // inhabitant count needs a non-zero check.
        reference: None,
        required_totals: vec![(reference_table, "einwohner")],
    })
}

/// Number of tables a level's spec expects for a schema generation.
#[must_use]
pub const fn table_count(level: AdminLevel, schema: SocialSchema) -> usize {
    let supplement = match schema {
        SocialSchema::Pre2020 => 0,
        SocialSchema::Post2020 => 1,
    };
    match level {
        AdminLevel::ForecastArea => 0,
        AdminLevel::District | AdminLevel::DistrictRegion => 2 + supplement,
        AdminLevel::PlanningArea => 4 + supplement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_areas_have_no_spec() {
        assert!(spec_for(AdminLevel::ForecastArea, SocialSchema::Pre2020).is_none());
    }

    #[test]
    fn field_tables_fit_the_declared_layout() {
        for level in [
            AdminLevel::District,
            AdminLevel::DistrictRegion,
            AdminLevel::PlanningArea,
        ] {
            for schema in [SocialSchema::Pre2020, SocialSchema::Post2020] {
                let spec = spec_for(level, schema).unwrap();
                let count = table_count(level, schema);
                assert!(
                    spec.fields.iter().all(|f| f.table < count),
                    "{level} {schema:?}: field table out of range"
                );
            }
        }
    }

    #[test]
    fn planning_areas_carry_index_fields() {
        let spec = spec_for(AdminLevel::PlanningArea, SocialSchema::Pre2020).unwrap();
        assert!(spec.fields.iter().any(|f| f.property == "status_index"));
        assert!(spec
            .fields
            .iter()
            .any(|f| f.property == "z_s1_percentage_unemployed"));
    }

    #[test]
    fn supplement_moves_housing_indicators_post_2020() {
        let pre = spec_for(AdminLevel::District, SocialSchema::Pre2020).unwrap();
        let post = spec_for(AdminLevel::District, SocialSchema::Post2020).unwrap();

        let table_of = |spec: &crate::BlendSpec, name: &str| {
            spec.fields
                .iter()
                .find(|f| f.property == name)
                .map(|f| f.table)
        };

        assert_eq!(table_of(&pre, "k08_urban_apartments"), Some(1));
        assert_eq!(table_of(&post, "k08_urban_apartments"), Some(2));
        assert_eq!(table_of(&post, "k01_youth_unemployment"), Some(1));
    }
}
