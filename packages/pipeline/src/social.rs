//! Social monitoring group runner: districts, district regions, and
//! planning areas (the reports publish no forecast-area tables).

use std::collections::HashMap;
use std::sync::Arc;

use berlin_lor_aggregate::AggregateMap;
use berlin_lor_blend::social::{self, SocialSchema};
use berlin_lor_models::AdminLevel;
use berlin_lor_source::progress::ProgressCallback;
use berlin_lor_source::registry::{self, DatasetDefinition, DatasetGroup};
use berlin_lor_statistics::StatisticTable;
use geojson::FeatureCollection;

use crate::blender::{extend_level, load_boundary};
use crate::levels::{LEVELS, LevelSpec, combined_constraint};
use crate::{PipelineError, RunOptions, data_dir, raw_dir};

/// The levels the social monitoring reports cover, as indexes into
/// [`LEVELS`].
const SOCIAL_LEVELS: [usize; 3] = [0, 2, 3];

/// Positions of a level's tables within a dataset's table bundle.
///
/// Bundle order is the registry's documented convention: pre2020
/// `[sdi, idx_plr, idx_bzr, idx_bez, z, ctx_plr, ctx_bzr, ctx_bez]`,
/// post2020 with a supplementary context table following each context
/// table. The returned order matches the layout
/// [`social::spec_for`] expects.
fn table_indices(level: AdminLevel, schema: SocialSchema) -> Vec<usize> {
    match (level, schema) {
        (AdminLevel::District, SocialSchema::Pre2020) => vec![3, 7],
        (AdminLevel::District, SocialSchema::Post2020) => vec![3, 9, 10],
        (AdminLevel::DistrictRegion, SocialSchema::Pre2020) => vec![2, 6],
        (AdminLevel::DistrictRegion, SocialSchema::Post2020) => vec![2, 7, 8],
        (AdminLevel::PlanningArea, SocialSchema::Pre2020) => vec![0, 1, 4, 5],
        (AdminLevel::PlanningArea, SocialSchema::Post2020) => vec![0, 1, 4, 5, 6],
        (AdminLevel::ForecastArea, _) => Vec::new(),
    }
}

fn load_tables(
    group: &DatasetGroup,
    dataset: &DatasetDefinition,
    statistics_dir: &std::path::Path,
) -> Vec<Option<StatisticTable>> {
    dataset
        .tables
        .iter()
        .map(|table| {
            let file_name = group.table_file_name(dataset, table)?;
            match StatisticTable::from_path(&statistics_dir.join(&file_name)) {
                Ok(table) => Some(table),
                Err(e) => {
                    log::warn!("Failed to load {file_name}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Blends every social monitoring dataset into the covered levels and
/// writes the per-dataset GeoJSON plus the per-level aggregate files.
///
/// # Errors
///
/// Returns [`PipelineError`] if the data directory is unusable or an
/// output cannot be written. Missing tables skip the affected level of
/// the affected dataset only.
pub fn run(
    options: &RunOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), PipelineError> {
    let group = registry::social();
    let data = data_dir();
    let statistics_dir = raw_dir().join("lor-statistics-social");
    std::fs::create_dir_all(&data)?;

    let mut boundaries: HashMap<String, FeatureCollection> = HashMap::new();
    let mut aggregates: [AggregateMap; 4] = Default::default();

    progress.set_message("Blending social monitoring statistics".to_owned());
    progress.set_total(group.datasets.len() as u64);

    for dataset in &group.datasets {
        progress.set_message(format!("Blending {}", dataset.id));

        let schema = match dataset.schema.as_str() {
            "pre2020" => SocialSchema::Pre2020,
            "post2020" => SocialSchema::Post2020,
            other => {
                log::warn!("Unknown schema {other} for {}, skipping dataset", dataset.id);
                progress.inc(1);
                continue;
            }
        };
        let tables = load_tables(&group, dataset, &statistics_dir);
        let period = dataset.period();

        for &index in &SOCIAL_LEVELS {
            let level: &LevelSpec = &LEVELS[index];
            let Some(spec) = social::spec_for(level.level, schema) else {
                continue;
            };

            let level_tables: Option<Vec<&StatisticTable>> = table_indices(level.level, schema)
                .into_iter()
                .map(|i| tables.get(i).and_then(Option::as_ref))
                .collect();
            let Some(level_tables) = level_tables else {
                log::info!("No {} tables in {}, skipping level", level.level, dataset.id);
                continue;
            };

            let file_name = level.boundary_file(dataset.geometry);
            let Some(collection) = load_boundary(&mut boundaries, &data, &file_name) else {
                continue;
            };

            let extended = extend_level(
                collection,
                &dataset.id,
                level,
                &level_tables,
                &spec,
                |id| combined_constraint(social::KEY_COLUMN, id),
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

    for &index in &SOCIAL_LEVELS {
        let aggregate = &mut aggregates[index];
        if aggregate.is_empty() {
            continue;
        }
        aggregate.append_summaries();

        let output = data.join(format!(
            "{}_{}_statistics.json",
            LEVELS[index].file_stem, group.group
        ));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_indices_match_spec_layouts() {
        for level in [
            AdminLevel::District,
            AdminLevel::DistrictRegion,
            AdminLevel::PlanningArea,
        ] {
            for schema in [SocialSchema::Pre2020, SocialSchema::Post2020] {
                let indices = table_indices(level, schema);
                assert_eq!(
                    indices.len(),
                    social::table_count(level, schema),
                    "{level} {schema:?}"
                );
            }
        }
    }

    #[test]
    fn bundle_indices_stay_within_schema_size() {
        for level in [
            AdminLevel::District,
            AdminLevel::DistrictRegion,
            AdminLevel::PlanningArea,
        ] {
            assert!(
                table_indices(level, SocialSchema::Pre2020)
                    .iter()
                    .all(|&i| i < 8)
            );
            assert!(
                table_indices(level, SocialSchema::Post2020)
                    .iter()
                    .all(|&i| i < 11)
            );
        }
    }

    #[test]
    fn social_levels_skip_forecast_areas() {
        assert!(
            SOCIAL_LEVELS
                .iter()
                .all(|&i| LEVELS[i].level != AdminLevel::ForecastArea)
        );
    }
}
