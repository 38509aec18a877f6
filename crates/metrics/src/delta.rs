//! Error differences against a reference model.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::MetricError;
use crate::nested::NestedTable;
use crate::station::{ErrorTable, format_cell};

/// `model -> metric name -> station id -> delta`.
pub type DeltaTable = NestedTable<String, String, BTreeMap<String, f64>>;

/// Computes `reference - model` for every other model and every metric the
/// two tables share. Bias-type metrics compare magnitudes,
/// `|reference| - |model|`, so a positive delta always means the model is
/// closer to zero bias.
///
/// # Errors
///
/// Returns [`MetricError::MissingReference`] if `reference` is not a key of
/// `errors`.
#[instrument(skip(errors), fields(models = errors.len()))]
pub fn error_deltas(
    errors: &BTreeMap<String, ErrorTable>,
    reference: &str,
) -> Result<DeltaTable, MetricError> {
    let ref_table = errors
        .get(reference)
        .ok_or_else(|| MetricError::MissingReference {
            model: reference.to_string(),
            available: errors.keys().cloned().collect(),
        })?;

    let mut deltas = DeltaTable::new();
    for (model, table) in errors.iter().filter(|(m, _)| m.as_str() != reference) {
        for &metric in ref_table.metrics() {
            let (Some(ref_col), Some(model_col)) = (ref_table.column(metric), table.column(metric))
            else {
                debug!(%model, %metric, "metric missing from one table, skipped");
                continue;
            };
            let values: BTreeMap<String, f64> = ref_col
                .iter()
                .filter_map(|(station, r)| {
                    let m = model_col.get(station)?;
                    let delta = if metric.is_bias() {
                        r.abs() - m.abs()
                    } else {
                        r - m
                    };
                    Some((station.clone(), delta))
                })
                .collect();
            deltas.insert(model.clone(), metric.name().to_string(), values);
        }
    }
    Ok(deltas)
}

/// Writes one `<prefix><metric>.csv` per metric with a `station_id` column
/// followed by one column per model.
pub fn write_metric_deltas(
    deltas: &DeltaTable,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, MetricError> {
    std::fs::create_dir_all(dir).map_err(|e| MetricError::Io {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let by_metric = deltas.clone().swap();
    let mut written = Vec::new();
    for metric in by_metric.outer_keys() {
        let Some(models) = by_metric.row(metric) else {
            continue;
        };
        let stations: BTreeSet<&String> = models.values().flat_map(BTreeMap::keys).collect();
        let path = dir.join(format!("{prefix}{metric}.csv"));
        let csv_err = |e: csv::Error| MetricError::Csv {
            path: path.clone(),
            reason: e.to_string(),
        };

        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        let mut header = vec!["station_id"];
        header.extend(models.keys().map(String::as_str));
        writer.write_record(&header).map_err(csv_err)?;
        for station in stations {
            let mut record = vec![station.clone()];
            record.extend(
                models
                    .values()
                    .map(|v| format_cell(v.get(station).copied().unwrap_or(f64::NAN))),
            );
            writer.write_record(&record).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| MetricError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        written.push(path);
    }
    Ok(written)
}
