//! Dataset registry — parses embedded TOML descriptors.
//!
//! One TOML document per key-figure group plus one for the boundary
//! files. Adding a reporting period means adding a `[[datasets]]` entry;
//! the transformation code never changes. The documents are baked into
//! the binary via [`include_str!`].

use berlin_lor_models::ReportingPeriod;
use serde::Deserialize;

/// Embedded descriptor documents.
const POPULATION_TOML: &str = include_str!("../datasets/population.toml");
const SOCIAL_TOML: &str = include_str!("../datasets/social.toml");
const BOUNDARIES_TOML: &str = include_str!("../datasets/boundaries.toml");

/// Boundary file vintage a dataset's statistics refer to. The LOR cut was
/// redrawn for 2021, so each dataset names the boundary generation its
/// keys match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GeometryVintage {
    /// Boundaries as of the 2019 LOR cut (also used by older reports).
    #[serde(rename = "v2019")]
    V2019,
    /// Boundaries as of the 2021 LOR cut.
    #[serde(rename = "v2021")]
    V2021,
}

/// How a dataset's table names map onto CSV file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableNaming {
    /// `{stem}_{table}.csv` — the population exports.
    Suffix,
    /// `{table}.csv` — the social monitoring exports, which carry full
    /// stems per table.
    Stem,
}

/// One reporting period of one key-figure group.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier within the group.
    pub id: String,
    /// File-name stem shared by the dataset's tables.
    pub stem: String,
    /// Four-digit reporting year.
    pub year: String,
    /// Two-digit half-year ("00" for yearly reports).
    pub half_year: String,
    /// Schema generation tag (column layout era).
    pub schema: String,
    /// Boundary generation the dataset's keys refer to.
    pub geometry: GeometryVintage,
    /// Table names in the group's canonical order. An empty string marks
    /// a table the source never published for this period.
    pub tables: Vec<String>,
    /// Suffix appended to output file names, used where one period was
    /// published against both boundary generations.
    #[serde(default)]
    pub output_suffix: String,
}

impl DatasetDefinition {
    /// The dataset's reporting period.
    #[must_use]
    pub fn period(&self) -> ReportingPeriod {
        ReportingPeriod {
            year: self.year.clone(),
            half_year: self.half_year.clone(),
        }
    }
}

/// All datasets of one key-figure group.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetGroup {
    /// Group name, used in output file names ("population", "social").
    pub group: String,
    /// How table names map onto CSV file names.
    pub table_naming: TableNaming,
    /// The datasets, in processing order.
    pub datasets: Vec<DatasetDefinition>,
}

impl DatasetGroup {
    /// CSV file name for one table of one dataset, or `None` for a table
    /// the source never published.
    #[must_use]
    pub fn table_file_name(&self, dataset: &DatasetDefinition, table: &str) -> Option<String> {
        if table.is_empty() {
            return None;
        }
        match self.table_naming {
            TableNaming::Suffix => Some(format!("{}_{table}.csv", dataset.stem)),
            TableNaming::Stem => Some(format!("{table}.csv")),
        }
    }
}

/// One boundary file on the open-data portal.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryFile {
    /// Local file name.
    pub name: String,
    /// Download URL.
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct BoundaryList {
    files: Vec<BoundaryFile>,
}

fn parse_group(name: &str, document: &str) -> DatasetGroup {
    toml::from_str(document).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
}

/// The population key-figure group.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (a compile-time guarantee in
/// practice, enforced by the tests below).
#[must_use]
pub fn population() -> DatasetGroup {
    parse_group("population", POPULATION_TOML)
}

/// The social urban development monitoring group.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn social() -> DatasetGroup {
    parse_group("social", SOCIAL_TOML)
}

/// The boundary files to download.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn boundaries() -> Vec<BoundaryFile> {
    let list: BoundaryList = toml::from_str(BOUNDARIES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse boundaries.toml: {e}"));
    list.files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_covers_all_reporting_periods() {
        let group = population();
        assert_eq!(group.group, "population");
        // Ten half-years before 2020, the doubled 2020h02 dataset, three after.
        assert_eq!(group.datasets.len(), 15);
    }

    #[test]
    fn social_covers_all_report_years() {
        let group = social();
        assert_eq!(group.group, "social");
        assert_eq!(group.datasets.len(), 5);
    }

    #[test]
    fn dataset_ids_are_unique_per_group() {
        for group in [population(), social()] {
            let mut ids: Vec<&str> = group.datasets.iter().map(|d| d.id.as_str()).collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), total, "{}: duplicate dataset id", group.group);
        }
    }

    #[test]
    fn population_datasets_carry_four_tables() {
        let group = population();
        for dataset in &group.datasets {
            assert_eq!(dataset.tables.len(), 4, "{}", dataset.id);
            assert!(dataset.tables.iter().all(|t| !t.is_empty()), "{}", dataset.id);
        }
    }

    #[test]
    fn social_table_counts_match_their_schema() {
        let group = social();
        for dataset in &group.datasets {
            let expected = match dataset.schema.as_str() {
                "pre2020" => 8,
                "post2020" => 11,
                other => panic!("{}: unknown schema {other}", dataset.id),
            };
            assert_eq!(dataset.tables.len(), expected, "{}", dataset.id);
        }
    }

    #[test]
    fn datasets_have_plausible_periods() {
        for group in [population(), social()] {
            for dataset in &group.datasets {
                assert_eq!(dataset.year.len(), 4, "{}", dataset.id);
                assert_eq!(dataset.half_year.len(), 2, "{}", dataset.id);
            }
        }
    }

    #[test]
    fn table_file_names_follow_the_group_convention() {
        let population = population();
        let dataset = &population.datasets[0];
        assert_eq!(
            population.table_file_name(dataset, "T1").as_deref(),
            Some("SB_A01-06-00_2015h01_BE_T1.csv")
        );

        let social = social();
        let dataset = &social.datasets[0];
        assert_eq!(
            social.table_file_name(dataset, "1-sdi_mss2013").as_deref(),
            Some("1-sdi_mss2013.csv")
        );
        assert_eq!(social.table_file_name(dataset, ""), None);
    }

    #[test]
    fn boundary_files_are_unique_and_https() {
        let files = boundaries();
        assert_eq!(files.len(), 7);

        let mut names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 7);

        for file in &files {
            assert!(file.url.starts_with("https://"), "{}", file.name);
        }
    }
}
