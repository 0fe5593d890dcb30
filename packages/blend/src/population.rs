//! Mapping table for the population key-figure group.
//!
//! Four statistic tables per reporting period, filtered by the
//! hierarchical LOR key columns:
//!
//! | index | table | content |
//! |-------|-------|---------|
//! | 0 | T1 | inhabitants by nationality and migration background |
//! | 1 | T2 | inhabitants by age group and sex |
//! | 2 | T3 | inhabitants with migration background by age group and sex |
//! | 3 | T4 | inhabitants by country of origin |
//!
//! Every property derives a percentage against the total-inhabitants sum
//! of T1 and a density against the unit area.

use crate::{BlendField, BlendSpec, modifier};

/// Key columns of the population tables, coarse to fine. A level's filter
/// uses the first `segment_count()` of these.
pub const KEY_COLUMNS: [&str; 4] = ["bezirk", "prognoseraum", "bezirksregion", "planungsraum"];

/// Number of statistic tables per reporting period.
pub const TABLE_COUNT: usize = 4;

const FIELDS: &[BlendField] = &[
    // T1: nationality and migration background
    modifier("inhabitants", 0, "insgesamt_anzahl"),
    modifier(
        "inhabitants_with_migration_background",
        0,
        "darunter_mit_migrationshintergrund_anzahl",
    ),
    modifier("inhabitants_germans", 0, "deutsche_zusammen_anzahl"),
    modifier(
        "inhabitants_germans_without_migration_background",
        0,
        "deutsche_ohne_migrationshintergrund_anzahl",
    ),
    modifier(
        "inhabitants_germans_with_migration_background",
        0,
        "deutsche_mit_migrationshintergrund_anzahl",
    ),
    modifier("inhabitants_foreigners", 0, "auslaender_anzahl"),
    // T2: age groups and sex
    modifier("inhabitants_age_below_6", 1, "alter_unter_6"),
    modifier("inhabitants_age_6_15", 1, "alter_6-15"),
    modifier("inhabitants_age_15_18", 1, "alter_15-18"),
    modifier("inhabitants_age_18_27", 1, "alter_18-27"),
    modifier("inhabitants_age_27_45", 1, "alter_27-45"),
    modifier("inhabitants_age_45_55", 1, "alter_45-55"),
    modifier("inhabitants_age_55_65", 1, "alter_55-65"),
    modifier("inhabitants_age_above_65", 1, "alter_65_und_mehr"),
    modifier("inhabitants_female", 1, "weiblich"),
    // T3: age groups and sex among inhabitants with migration background
    modifier(
        "inhabitants_with_migration_background_age_below_6",
        2,
        "alter_unter_6",
    ),
    modifier(
        "inhabitants_with_migration_background_age_6_15",
        2,
        "alter_6-15",
    ),
    modifier(
        "inhabitants_with_migration_background_age_15_18",
        2,
        "alter_15-18",
    ),
    modifier(
        "inhabitants_with_migration_background_age_18_27",
        2,
        "alter_18-27",
    ),
    modifier(
        "inhabitants_with_migration_background_age_27_45",
        2,
        "alter_27-45",
    ),
    modifier(
        "inhabitants_with_migration_background_age_45_55",
        2,
        "alter_45-55",
    ),
    modifier(
        "inhabitants_with_migration_background_age_55_65",
        2,
        "alter_55-65",
    ),
    modifier(
        "inhabitants_with_migration_background_age_above_65",
        2,
        "alter_65_und_mehr",
    ),
    modifier(
        "inhabitants_with_migration_background_female",
        2,
        "weiblich",
    ),
    // T4: countries of origin
    modifier("inhabitants_from_european_union", 3, "europaeische_union"),
    modifier("inhabitants_from_france", 3, "frankreich"),
    modifier("inhabitants_from_greece", 3, "griechenland"),
    modifier("inhabitants_from_italy", 3, "italien"),
    modifier("inhabitants_from_austria", 3, "oesterreich"),
    modifier("inhabitants_from_spain", 3, "spanien"),
    modifier("inhabitants_from_poland", 3, "polen"),
    modifier("inhabitants_from_bulgaria", 3, "bulgarien"),
    modifier("inhabitants_from_rumania", 3, "rumaenien"),
    modifier("inhabitants_from_croatia", 3, "kroatien"),
    modifier(
        "inhabitants_from_united_kingdom",
        3,
        "vereinigtes_koenigreich",
    ),
    modifier(
        "inhabitants_from_former_yugoslavia",
        3,
        "ehemaliges_jugoslawien",
    ),
    modifier(
        "inhabitants_from_bosnia_herzegovina",
        3,
        "bosnien_und_herzegowina",
    ),
    modifier("inhabitants_from_serbia", 3, "serbien"),
    modifier(
        "inhabitants_from_former_soviet_union",
        3,
        "ehemalige_sowjetunion",
    ),
    modifier("inhabitants_from_russia", 3, "russische_foederation"),
    modifier("inhabitants_from_ukraine", 3, "ukraine"),
    modifier("inhabitants_from_kazakhstan", 3, "kasachstan"),
    modifier(
        "inhabitants_from_islamic_countries",
        3,
        "islamische_laender",
    ),
    modifier("inhabitants_from_turkey", 3, "tuerkei"),
    modifier("inhabitants_from_iran", 3, "iran"),
    modifier(
        "inhabitants_from_arabic_countries",
        3,
        "arabische_laender",
    ),
    modifier("inhabitants_from_lebanon", 3, "libanon"),
    modifier("inhabitants_from_syria", 3, "syrien"),
    modifier("inhabitants_from_vietnam", 3, "vietnam"),
    modifier(
        "inhabitants_from_united_states",
        3,
        "vereinigte_staaten",
    ),
    modifier(
        "inhabitants_from_undefined",
        3,
        "nicht_eindeutig_zuordenbar_ohne_angabe",
    ),
];

/// The population blend spec. Identical for all four administrative
/// levels and all schema generations; only the filter constraints differ.
#[must_use]
pub fn spec() -> BlendSpec {
    BlendSpec {
        fields: FIELDS.to_vec(),
        reference: Some((0, "insgesamt_anzahl")),
        required_totals: vec![
            (0, "insgesamt_anzahl"),
            (0, "darunter_mit_migrationshintergrund_anzahl"),
        ],
    }
}
