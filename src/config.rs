use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// Top-level pipeline configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DroughtConfig {
    /// I/O settings.
    #[serde(default)]
    pub io: IoConfig,

    /// Feature engineering settings.
    #[serde(default)]
    pub engineer: EngineerToml,

    /// Region analysis settings.
    #[serde(default)]
    pub analysis: AnalysisToml,

    /// Station error settings.
    #[serde(default)]
    pub errors: ErrorsToml,
}

impl DroughtConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_experiment")]
    pub experiment: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            experiment: default_experiment(),
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_experiment() -> String {
    "one_month_forecast".to_string()
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineerToml {
    /// Preprocessed dataset (`.parquet`, or `.nc` with the `netcdf` feature).
    pub input: Option<PathBuf>,
    /// Variables to read from a NetCDF input; empty reads the target only.
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default = "default_target_variable")]
    pub target_variable: String,
    #[serde(default = "default_pred_months")]
    pub pred_months: u32,
    /// Required input window length; defaults to `pred_months`.
    #[serde(default)]
    pub expected_length: Option<usize>,
    /// Skip the window length check.
    #[serde(default)]
    pub allow_incomplete: bool,
    #[serde(default = "default_test_years")]
    pub test_years: Vec<i32>,
    #[serde(default)]
    pub train_years: Option<Vec<i32>>,
    /// `YYYY-MM` test months; replaces the year split when set.
    #[serde(default)]
    pub test_timesteps: Option<Vec<String>>,
    #[serde(default)]
    pub train_timesteps: Option<Vec<String>>,
}

impl Default for EngineerToml {
    fn default() -> Self {
        Self {
            input: None,
            variables: Vec::new(),
            target_variable: default_target_variable(),
            pred_months: default_pred_months(),
            expected_length: None,
            allow_incomplete: false,
            test_years: default_test_years(),
            train_years: None,
            test_timesteps: None,
            train_timesteps: None,
        }
    }
}

fn default_target_variable() -> String {
    "VHI".to_string()
}
fn default_pred_months() -> u32 {
    12
}
fn default_test_years() -> Vec<i32> {
    vec![2016]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisToml {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub admin_level: Option<u8>,
    /// Metrics averaged per region from per-pixel maps; empty skips them.
    #[serde(default)]
    pub metric_maps: Vec<String>,
}

impl Default for AnalysisToml {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            admin_level: None,
            metric_maps: Vec::new(),
        }
    }
}

fn default_kind() -> String {
    "administrative".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorsToml {
    /// Model name -> `station_id,time,obs,sim` CSV.
    #[serde(default)]
    pub predictions: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub reference: Option<String>,
    /// Metric names; empty means the station default set.
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub seasonal: bool,
    /// Relative paths are resolved against `io.data_dir`.
    #[serde(default = "default_errors_output")]
    pub output_dir: PathBuf,
}

impl Default for ErrorsToml {
    fn default() -> Self {
        Self {
            predictions: BTreeMap::new(),
            reference: None,
            metrics: Vec::new(),
            seasonal: false,
            output_dir: default_errors_output(),
        }
    }
}

fn default_errors_output() -> PathBuf {
    PathBuf::from("analysis/station_errors")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: DroughtConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.io.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.io.experiment, "one_month_forecast");
        assert_eq!(cfg.engineer.target_variable, "VHI");
        assert_eq!(cfg.engineer.pred_months, 12);
        assert_eq!(cfg.analysis.kind, "administrative");
        assert!(cfg.errors.predictions.is_empty());
    }

    #[test]
    fn sections_parse() {
        let cfg: DroughtConfig = toml::from_str(
            r#"
            [io]
            data_dir = "/srv/drought"

            [engineer]
            input = "interim/kenya.parquet"
            pred_months = 3
            test_timesteps = ["2018-03", "2018-04"]

            [analysis]
            kind = "landcover"
            metric_maps = ["rmse", "kge"]

            [errors]
            reference = "persistence"
            seasonal = true

            [errors.predictions]
            ealstm = "ealstm.csv"
            persistence = "persistence.csv"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engineer.pred_months, 3);
        assert_eq!(cfg.engineer.test_timesteps.as_ref().map(Vec::len), Some(2));
        assert_eq!(cfg.analysis.metric_maps, vec!["rmse", "kge"]);
        assert_eq!(cfg.errors.predictions.len(), 2);
        assert!(cfg.errors.seasonal);
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = toml::from_str::<DroughtConfig>("[io]\ndata = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = DroughtConfig::load(Path::new("/nonexistent/drought.toml")).unwrap();
        assert_eq!(cfg.io.row_group_size, 1_000_000);
    }
}
