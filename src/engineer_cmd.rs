//! Engineer command: stratify a gridded dataset into forecasting examples.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use drought_engineer::{FeatureWriter, engineer};
use drought_io::{GriddedSeries, read_series};

use crate::cli::EngineerArgs;
use crate::config::EngineerToml;
use crate::convert;

#[cfg(feature = "netcdf")]
fn read_input(path: &Path, eng: &EngineerToml) -> Result<GriddedSeries> {
    if path.extension().is_some_and(|e| e == "nc") {
        let variables = if eng.variables.is_empty() {
            vec![eng.target_variable.clone()]
        } else {
            eng.variables.clone()
        };
        let cfg = drought_io::NetcdfConfig::default().with_variables(variables);
        return drought_io::read_netcdf(path, &cfg)
            .with_context(|| format!("failed to read NetCDF: {}", path.display()));
    }
    read_series(path).with_context(|| format!("failed to read Parquet: {}", path.display()))
}

#[cfg(not(feature = "netcdf"))]
fn read_input(path: &Path, _eng: &EngineerToml) -> Result<GriddedSeries> {
    if path.extension().is_some_and(|e| e == "nc") {
        anyhow::bail!(
            "{} is NetCDF; rebuild with `--features netcdf` or convert it to Parquet",
            path.display()
        );
    }
    read_series(path).with_context(|| format!("failed to read Parquet: {}", path.display()))
}

/// Run feature engineering for one experiment.
pub fn run(args: EngineerArgs) -> Result<()> {
    let _cmd = info_span!("engineer").entered();
    let mut config = args.common.load_config()?;
    if let Some(target) = args.target {
        config.engineer.target_variable = target;
    }

    let input = args
        .input
        .or_else(|| config.engineer.input.clone())
        .ok_or_else(|| anyhow!("no input path: set [engineer].input in config or use --input"))?;
    let input = if input.is_relative() && !input.exists() {
        config.io.data_dir.join(input)
    } else {
        input
    };

    let engineer_cfg = convert::build_engineer_config(&config.engineer)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    info!(path = %input.display(), "reading dataset");
    let ds = read_input(&input, &config.engineer)?;
    info!(shape = ?ds.shape(), variables = ?ds.variable_names(), "dataset loaded");

    let root = config
        .io
        .data_dir
        .join("features")
        .join(&config.io.experiment);
    let mut writer = FeatureWriter::new(&root, writer_cfg);
    let report = engineer(&ds, &engineer_cfg, &mut writer).context("feature engineering failed")?;

    info!(
        root = %root.display(),
        test = report.test_dates.len(),
        train = report.train_dates.len(),
        skipped = report.skipped,
        "examples written"
    );
    Ok(())
}
