//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, anyhow, bail};

use drought_calendar::YearMonth;
use drought_engineer::{EngineerConfig, SplitStrategy};
use drought_io::{Compression, WriterConfig};
use drought_metrics::MetricKind;
use drought_regions::AnalysisKind;

use crate::config::*;

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Parses `YYYY-MM` month strings.
pub fn parse_months(items: &[String]) -> Result<Vec<YearMonth>> {
    items
        .iter()
        .map(|s| {
            s.parse::<YearMonth>()
                .with_context(|| format!("invalid month {s:?}, expected YYYY-MM"))
        })
        .collect()
}

/// Parses metric names; an empty list gives the station default set.
pub fn parse_metrics(names: &[String]) -> Result<Vec<MetricKind>> {
    if names.is_empty() {
        return Ok(MetricKind::STATION.to_vec());
    }
    names
        .iter()
        .map(|n| n.parse::<MetricKind>().map_err(anyhow::Error::from))
        .collect()
}

/// Parses an analysis kind name (`administrative` or `landcover`).
pub fn parse_analysis_kind(s: &str) -> Result<AnalysisKind> {
    s.parse::<AnalysisKind>().map_err(|e| anyhow!(e))
}

/// Builds the [`SplitStrategy`]: a timestep split when `test_timesteps` is
/// set, a year split otherwise.
pub fn build_split(eng: &EngineerToml) -> Result<SplitStrategy> {
    match &eng.test_timesteps {
        Some(test) => {
            if eng.train_years.is_some() {
                bail!("train_years cannot be combined with test_timesteps; use train_timesteps");
            }
            let train = eng.train_timesteps.as_deref().map(parse_months).transpose()?;
            Ok(SplitStrategy::Timesteps {
                test: parse_months(test)?,
                train,
            })
        }
        None => {
            if eng.train_timesteps.is_some() {
                bail!("train_timesteps requires test_timesteps");
            }
            Ok(SplitStrategy::Years {
                test_years: eng.test_years.clone(),
                train_years: eng.train_years.clone(),
            })
        }
    }
}

/// Builds an [`EngineerConfig`] from the TOML engineer configuration.
pub fn build_engineer_config(eng: &EngineerToml) -> Result<EngineerConfig> {
    let expected_length = if eng.allow_incomplete {
        None
    } else {
        Some(eng.expected_length.unwrap_or(eng.pred_months as usize))
    };
    let cfg = EngineerConfig::new(build_split(eng)?)
        .with_target_variable(&eng.target_variable)
        .with_pred_months(eng.pred_months)
        .with_expected_length(expected_length);
    cfg.validate().context("invalid [engineer] configuration")?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] from the TOML I/O configuration.
pub fn build_writer_config(io: &IoConfig) -> Result<WriterConfig> {
    let compression = parse_compression(&io.compression)?;
    let cfg = WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(io.row_group_size);
    cfg.validate().context("invalid [io] configuration")?;
    Ok(cfg)
}
