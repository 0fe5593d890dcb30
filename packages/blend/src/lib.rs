#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Field derivation ("blending") of statistic sums into feature properties.
//!
//! A [`BlendSpec`] is a fixed mapping table: for every target property it
//! names the source table and column to sum. Derived `_percentage` and
//! `_per_sqkm` companions are emitted only when their denominators exist —
//! a missing reference total or area silently omits the companion, and an
//! unparseable source column omits the property altogether. Zeros are
//! never written as stand-ins.

pub mod population;
pub mod social;

use berlin_lor_statistics::FilteredRows;

/// A feature's mutable property bag.
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// How a mapped field is written into the property map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Value plus derived `_percentage` (against the reference total) and
    /// `_per_sqkm` (against the unit area) companions.
    WithModifiers,
    /// Value only, copied as-is.
    Plain,
}

/// One entry of a blend mapping table.
#[derive(Debug, Clone, Copy)]
pub struct BlendField {
    /// Target property name in the feature's property map.
    pub property: &'static str,
    /// Index into the table slice handed to [`blend_into`].
    pub table: usize,
    /// Source column to sum.
    pub column: &'static str,
    /// Whether derived companions are emitted.
    pub kind: FieldKind,
}

const fn modifier(property: &'static str, table: usize, column: &'static str) -> BlendField {
    BlendField {
        property,
        table,
        column,
        kind: FieldKind::WithModifiers,
    }
}

const fn plain(property: &'static str, table: usize, column: &'static str) -> BlendField {
    BlendField {
        property,
        table,
        column,
        kind: FieldKind::Plain,
    }
}

/// A complete mapping table for one key-figure group and table layout.
#[derive(Debug, Clone)]
pub struct BlendSpec {
    /// The fields to derive, in output order.
    pub fields: Vec<BlendField>,
    /// (table, column) whose sum is the reference total for `_percentage`
    /// fields, or `None` when the group derives no percentages.
    pub reference: Option<(usize, &'static str)>,
    /// (table, column) pairs that must sum to a non-zero total for a unit
    /// to count as having data in this period.
    pub required_totals: Vec<(usize, &'static str)>,
}

impl BlendSpec {
    /// Checks the "no data" contract for a unit: every table must have
    /// matched at least one row and every required total must be non-zero.
    #[must_use]
    pub fn has_data(&self, tables: &[FilteredRows<'_>]) -> bool {
        tables.iter().all(|rows| !rows.is_empty())
            && self
                .required_totals
                .iter()
                .all(|&(table, column)| tables[table].has_nonzero_total(column))
    }
}

/// Rounds to two decimal places (percentage precision).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derives all fields of `spec` from the filtered `tables` and writes them
/// into `properties`.
///
/// `area_sqkm` of `None` (or zero) suppresses every `_per_sqkm` companion;
/// an absent or all-unparseable source column suppresses that property and
/// its companions entirely.
pub fn blend_into(
    properties: &mut PropertyMap,
    area_sqkm: Option<f64>,
    tables: &[FilteredRows<'_>],
    spec: &BlendSpec,
) {
    let reference = spec
        .reference
        .and_then(|(table, column)| tables.get(table)?.sum(column))
        .filter(|&total| total != 0.0);
    let area = area_sqkm.filter(|&a| a != 0.0);

    for field in &spec.fields {
        let Some(rows) = tables.get(field.table) else {
            continue;
        };
        let Some(value) = rows.sum(field.column) else {
            log::debug!(
                "No usable column {} in {}, omitting {}",
                field.column,
                rows.table().name(),
                field.property
            );
            continue;
        };

        properties.insert(field.property.to_owned(), value.into());

        if field.kind == FieldKind::Plain {
            continue;
        }

        if let Some(total) = reference {
            properties.insert(
                format!("{}_percentage", field.property),
                round2(value / total * 100.0).into(),
            );
        }
        if let Some(area_sqkm) = area {
            #[allow(clippy::cast_possible_truncation)]
            let density = (value / area_sqkm).round() as i64;
            properties.insert(format!("{}_per_sqkm", field.property), density.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berlin_lor_statistics::StatisticTable;

    fn table(name: &str, csv: &str) -> StatisticTable {
        StatisticTable::from_reader(name.to_owned(), csv.as_bytes()).unwrap()
    }

    fn spec() -> BlendSpec {
        BlendSpec {
            fields: vec![
                modifier("inhabitants", 0, "insgesamt_anzahl"),
                modifier(
                    "inhabitants_with_migration_background",
                    0,
                    "darunter_mit_migrationshintergrund_anzahl",
                ),
                plain("status_index", 0, "status_index"),
            ],
            reference: Some((0, "insgesamt_anzahl")),
            required_totals: vec![(0, "insgesamt_anzahl")],
        }
    }

    #[test]
    fn derives_value_percentage_and_density() {
        let t = table(
            "t1",
            "bezirk,insgesamt_anzahl,darunter_mit_migrationshintergrund_anzahl,status_index\n\
             1,100,20,2.5\n",
        );
        let rows = vec![t.filter(&[("bezirk".to_owned(), 1)])];

        let mut props = PropertyMap::new();
        blend_into(&mut props, Some(39.34), &rows, &spec());

        assert_eq!(props["inhabitants"], 100.0);
        assert_eq!(props["inhabitants_percentage"], 100.0);
        assert_eq!(props["inhabitants_per_sqkm"], 3);
        assert_eq!(props["inhabitants_with_migration_background"], 20.0);
        assert_eq!(props["inhabitants_with_migration_background_percentage"], 20.0);
        assert_eq!(props["inhabitants_with_migration_background_per_sqkm"], 1);
    }

    #[test]
    fn plain_fields_get_no_companions() {
        let t = table(
            "t1",
            "bezirk,insgesamt_anzahl,darunter_mit_migrationshintergrund_anzahl,status_index\n\
             1,100,20,2.5\n",
        );
        let rows = vec![t.filter(&[("bezirk".to_owned(), 1)])];

        let mut props = PropertyMap::new();
        blend_into(&mut props, Some(39.34), &rows, &spec());

        assert_eq!(props["status_index"], 2.5);
        assert!(!props.contains_key("status_index_percentage"));
        assert!(!props.contains_key("status_index_per_sqkm"));
    }

    #[test]
    fn missing_area_omits_density() {
        let t = table("t1", "bezirk,insgesamt_anzahl\n1,100\n");
        let rows = vec![t.filter(&[("bezirk".to_owned(), 1)])];

        let mut props = PropertyMap::new();
        blend_into(&mut props, None, &rows, &spec());

        assert_eq!(props["inhabitants"], 100.0);
        assert!(props.keys().all(|k| !k.ends_with("_per_sqkm")));
    }

    #[test]
    fn zero_reference_omits_percentages() {
        let t = table("t1", "bezirk,insgesamt_anzahl\n1,0\n");
        let rows = vec![t.filter(&[("bezirk".to_owned(), 1)])];

        let mut props = PropertyMap::new();
        blend_into(&mut props, Some(39.34), &rows, &spec());

        assert_eq!(props["inhabitants"], 0.0);
        assert!(props.keys().all(|k| !k.ends_with("_percentage")));
    }

    #[test]
    fn unparseable_source_column_is_omitted_not_zeroed() {
        let t = table(
            "t1",
            "bezirk,insgesamt_anzahl,darunter_mit_migrationshintergrund_anzahl\n1,100,x\n",
        );
        let rows = vec![t.filter(&[("bezirk".to_owned(), 1)])];

        let mut props = PropertyMap::new();
        blend_into(&mut props, Some(39.34), &rows, &spec());

        assert!(!props.contains_key("inhabitants_with_migration_background"));
        assert!(!props.contains_key("inhabitants_with_migration_background_percentage"));
    }

    #[test]
    fn has_data_requires_rows_and_nonzero_totals() {
        let t = table("t1", "bezirk,insgesamt_anzahl\n1,100\n2,0\n");

        let with_data = vec![t.filter(&[("bezirk".to_owned(), 1)])];
        assert!(spec().has_data(&with_data));

        let zero_total = vec![t.filter(&[("bezirk".to_owned(), 2)])];
        assert!(!spec().has_data(&zero_total));

        let no_rows = vec![t.filter(&[("bezirk".to_owned(), 3)])];
        assert!(!spec().has_data(&no_rows));
    }
}
