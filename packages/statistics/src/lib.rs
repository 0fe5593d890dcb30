#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Tabular statistic datasets loaded from CSV.
//!
//! A [`StatisticTable`] holds one reporting period of one thematic dataset
//! as header-keyed rows. Rows are selected by a list of (key column,
//! integer value) constraints that must all match — the single filter
//! routine that replaces the original per-level lookup variants. Column
//! sums drive the downstream field derivation.

use std::path::Path;

/// Errors that can occur while loading statistic tables.
#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// One loaded statistic table: a header row plus data rows, all as text.
///
/// Cells stay unparsed until a filter or sum asks for them; the source
/// files mix integer counts, decimal shares, and placeholder strings in
/// the same columns across years.
#[derive(Debug, Clone)]
pub struct StatisticTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StatisticTable {
    /// Loads a table from a CSV file. The table name is the file stem,
    /// used in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`StatisticsError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, StatisticsError> {
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        let file = std::fs::File::open(path)?;
        Self::from_reader(name, file)
    }

    /// Loads a table from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`StatisticsError`] if the CSV cannot be parsed.
    pub fn from_reader<R: std::io::Read>(
        name: String,
        reader: R,
    ) -> Result<Self, StatisticsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(|c| c.trim().to_owned()).collect());
        }

        log::debug!("Loaded {} rows from {name}", rows.len());

        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    /// The table name (file stem), used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Selects the rows whose key columns match all `constraints` by
    /// integer equality.
    ///
    /// A constraint on a column the table does not have matches nothing,
    /// which callers treat the same as an empty subset ("no data").
    #[must_use]
    pub fn filter(&self, constraints: &[(String, i64)]) -> FilteredRows<'_> {
        let mut indices: Option<Vec<usize>> = None;

        for (column, target) in constraints {
            let Some(col) = self.column_index(column) else {
                log::debug!("{}: no key column {column}", self.name);
                return FilteredRows {
                    table: self,
                    indices: Vec::new(),
                };
            };

            let candidates: Vec<usize> = match indices {
                Some(previous) => previous
                    .into_iter()
                    .filter(|&i| row_matches(&self.rows[i], col, *target))
                    .collect(),
                None => (0..self.rows.len())
                    .filter(|&i| row_matches(&self.rows[i], col, *target))
                    .collect(),
            };
            indices = Some(candidates);
        }

        FilteredRows {
            table: self,
            indices: indices.unwrap_or_else(|| (0..self.rows.len()).collect()),
        }
    }
}

fn row_matches(row: &[String], col: usize, target: i64) -> bool {
    row.get(col)
        .and_then(|cell| parse_int_cell(cell))
        .is_some_and(|value| value == target)
}

/// Parses a key cell as an integer, tolerating a decimal spelling of a
/// whole number ("4.0") as some exports produce.
fn parse_int_cell(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.fract() == 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        Some(whole)
    } else {
        None
    }
}

/// A filtered view onto a [`StatisticTable`].
#[derive(Debug)]
pub struct FilteredRows<'a> {
    table: &'a StatisticTable,
    indices: Vec<usize>,
}

impl FilteredRows<'_> {
    /// Whether the subset contains no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of rows in the subset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// The table this subset was filtered from.
    #[must_use]
    pub const fn table(&self) -> &StatisticTable {
        self.table
    }

    /// Sums `column` over the subset.
    ///
    /// Returns `None` when the column does not exist or no cell in it
    /// parses as a number — the caller then omits the derived property
    /// instead of writing a zero. Unparseable cells in an otherwise
    /// numeric column are skipped.
    #[must_use]
    pub fn sum(&self, column: &str) -> Option<f64> {
        let col = self.table.column_index(column)?;

        let mut total = 0.0;
        let mut parsed_any = false;
        for &i in &self.indices {
            if let Some(cell) = self.table.rows[i].get(col)
                && let Ok(value) = cell.trim().parse::<f64>()
            {
                total += value;
                parsed_any = true;
            }
        }

        parsed_any.then_some(total)
    }

    /// Whether `column` sums to a usable non-zero total.
    ///
    /// Used for the required-total check: a zero or missing total means
    /// the unit has no data for this period.
    #[must_use]
    pub fn has_nonzero_total(&self, column: &str) -> bool {
        self.sum(column).is_some_and(|total| total != 0.0)
    }
}
