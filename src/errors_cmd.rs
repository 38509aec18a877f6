//! Errors command: station error tables, deltas and seasonal breakdowns.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use drought_metrics::{
    StationData, calculate_errors, error_deltas, seasonal_deltas, seasonal_errors,
    write_metric_deltas,
};

use crate::cli::ErrorsArgs;
use crate::convert;

/// Run the station error workflow.
pub fn run(args: ErrorsArgs) -> Result<()> {
    let _cmd = info_span!("errors").entered();
    let config = args.common.load_config()?;
    let errors = &config.errors;
    if errors.predictions.is_empty() {
        bail!("no predictions: set [errors.predictions] model = \"path.csv\" in config");
    }
    let metrics = convert::parse_metrics(&errors.metrics)?;
    let reference = args.reference.or_else(|| errors.reference.clone());
    let seasonal = args.seasonal || errors.seasonal;
    let out_dir: PathBuf = args
        .output_dir
        .unwrap_or_else(|| config.io.data_dir.join(&errors.output_dir));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut models = BTreeMap::new();
    for (model, path) in &errors.predictions {
        let data = StationData::read_csv(path)
            .with_context(|| format!("failed to read predictions of {model}"))?;
        info!(%model, stations = data.len(), "station predictions loaded");
        models.insert(model.clone(), data);
    }

    let mut tables = BTreeMap::new();
    for (model, data) in &models {
        let table = calculate_errors(data, &metrics);
        let path = out_dir.join(format!("{model}_errors.csv"));
        table.write_csv(&path)?;
        info!(%model, path = %path.display(), "error table written");
        tables.insert(model.clone(), table);
    }

    if let Some(reference) = &reference {
        let deltas = error_deltas(&tables, reference)?;
        let written = write_metric_deltas(&deltas, &out_dir, "delta_")?;
        info!(%reference, files = written.len(), "error deltas written");
    }

    if seasonal {
        let by_season = seasonal_errors(&models, &metrics);
        for (season, model, table) in by_season.iter() {
            let path = out_dir.join(format!("{model}_{}_errors.csv", season.label()));
            table.write_csv(&path)?;
        }
        if let Some(reference) = &reference {
            for (season, deltas) in seasonal_deltas(&by_season, reference)? {
                write_metric_deltas(&deltas, &out_dir, &format!("delta_{}_", season.label()))?;
            }
        }
        info!(seasons = by_season.outer_keys().count(), "seasonal errors written");
    }

    info!(out_dir = %out_dir.display(), models = tables.len(), "station errors complete");
    Ok(())
}
