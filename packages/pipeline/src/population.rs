//! Population group runner: all reporting periods, all four levels.

use std::collections::HashMap;
use std::sync::Arc;

use berlin_lor_aggregate::AggregateMap;
use berlin_lor_blend::population;
use berlin_lor_source::progress::ProgressCallback;
use berlin_lor_source::registry;
use berlin_lor_statistics::StatisticTable;
use geojson::FeatureCollection;

use crate::blender::{extend_level, load_boundary};
use crate::levels::{LEVELS, hierarchy_constraints};
use crate::{PipelineError, RunOptions, data_dir, raw_dir};

/// Blends every population dataset into every level's boundaries and
/// writes the per-dataset GeoJSON plus the per-level aggregate files.
///
/// # Errors
///
/// Returns [`PipelineError`] if the data directory is unusable or an
/// output cannot be written. Datasets with missing or unreadable tables
/// are logged and skipped.
pub fn run(
    options: &RunOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), PipelineError> {
    let group = registry::population();
    let spec = population::spec();
    let data = data_dir();
    let statistics_dir = raw_dir().join("lor-statistics-population");
    std::fs::create_dir_all(&data)?;

    let mut boundaries: HashMap<String, FeatureCollection> = HashMap::new();
    let mut aggregates: [AggregateMap; 4] = Default::default();

    progress.set_message("Blending population statistics".to_owned());
    progress.set_total(group.datasets.len() as u64);

    for dataset in &group.datasets {
        progress.set_message(format!("Blending {}", dataset.id));

        let mut tables: Vec<StatisticTable> = Vec::with_capacity(dataset.tables.len());
        for table in &dataset.tables {
            let Some(file_name) = group.table_file_name(dataset, table) else {
                continue;
            };
            match StatisticTable::from_path(&statistics_dir.join(&file_name)) {
                Ok(table) => tables.push(table),
                Err(e) => log::warn!("Failed to load {file_name}: {e}"),
            }
        }
        if tables.len() != dataset.tables.len() {
            log::warn!("Incomplete tables for {}, skipping dataset", dataset.id);
            progress.inc(1);
            continue;
        }
        let table_refs: Vec<&StatisticTable> = tables.iter().collect();

        let period = dataset.period();
        for (index, level) in LEVELS.iter().enumerate() {
            let file_name = level.boundary_file(dataset.geometry);
            let Some(collection) = load_boundary(&mut boundaries, &data, &file_name) else {
                continue;
            };

            let extended = extend_level(
                collection,
                &dataset.id,
                level,
                &table_refs,
                &spec,
                |id| hierarchy_constraints(level.level, id, &population::KEY_COLUMNS),
                &mut aggregates[index],
                &period,
            );

            let output = data.join(format!(
                "{}_{}_{}_{}{}.geojson",
                level.file_stem, group.group, period.year, period.half_year, dataset.output_suffix
            ));
            let written = berlin_lor_geodata::write_feature_collection(
                &output,
                &extended,
                options.clean,
            )?;
            if written && !options.quiet {
                log::info!(
                    "Blended data from {} into {}",
                    dataset.id,
                    output.file_name().unwrap_or_default().to_string_lossy()
                );
            }
        }

        progress.inc(1);
    }

    for (index, level) in LEVELS.iter().enumerate() {
        let aggregate = &mut aggregates[index];
        if aggregate.is_empty() {
            continue;
        }
        aggregate.append_summaries();

        let output = data.join(format!("{}_{}_statistics.json", level.file_stem, group.group));
        let written = aggregate.write_json(&output, options.clean)?;
        if written && !options.quiet {
            log::info!(
                "Aggregated data from {} into {}",
                group.group,
                output.file_name().unwrap_or_default().to_string_lossy()
            );
        }
    }

    Ok(())
}
