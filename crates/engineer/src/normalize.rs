//! Per-variable normalization statistics.

use std::collections::BTreeMap;
use std::path::Path;

use drought_io::GriddedSeries;
use drought_stats::{nan_mean, nan_std};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::EngineerError;

/// File name of the persisted record inside an experiment's feature directory.
pub const NORMALIZATION_FILE: &str = "normalizing_dict.json";

/// Mean and population standard deviation of one variable.
///
/// Non-finite values are written to JSON as `null` and read back as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    /// Mean over time, lat and lon.
    #[serde(deserialize_with = "nan_if_null")]
    pub mean: f64,
    /// Population standard deviation over time, lat and lon.
    #[serde(deserialize_with = "nan_if_null")]
    pub std: f64,
}

fn nan_if_null<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

/// `{variable: {mean, std}}` computed from the training partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationRecord {
    stats: BTreeMap<String, VariableStats>,
}

impl NormalizationRecord {
    /// Statistics for `variable`.
    pub fn get(&self, variable: &str) -> Option<&VariableStats> {
        self.stats.get(variable)
    }

    /// `(variable, stats)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableStats)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether no variable is recorded.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Writes the record as pretty-printed JSON, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineerError::Normalization`] on serialisation or I/O failure.
    pub fn save_json(&self, path: &Path) -> Result<(), EngineerError> {
        let err = |reason: String| EngineerError::Normalization {
            path: path.to_path_buf(),
            reason,
        };
        let text = serde_json::to_string_pretty(self).map_err(|e| err(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| err(e.to_string()))
    }

    /// Reads a record written by [`save_json`](Self::save_json).
    ///
    /// # Errors
    ///
    /// Returns [`EngineerError::Normalization`] if the file is missing or malformed.
    pub fn load_json(path: &Path) -> Result<Self, EngineerError> {
        let err = |reason: String| EngineerError::Normalization {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| err(e.to_string()))
    }
}

/// Computes NaN-skipping mean and population std per variable.
///
/// Variables whose name ends in `one_hot` are categorical indicators and get
/// `{mean: 0, std: 1}` so they pass through scaling unchanged.
pub fn calculate_normalization_values(train: &GriddedSeries) -> NormalizationRecord {
    let stats = train
        .variables()
        .map(|(name, data)| {
            let stats = if name.ends_with("one_hot") {
                VariableStats {
                    mean: 0.0,
                    std: 1.0,
                }
            } else {
                let values: Vec<f64> = data.iter().copied().collect();
                let s = VariableStats {
                    mean: nan_mean(&values),
                    std: nan_std(&values, 0),
                };
                if !s.mean.is_finite() {
                    warn!(variable = name, "no finite training values; mean is NaN");
                } else if s.std == 0.0 {
                    warn!(variable = name, "constant in training partition; std is 0");
                }
                s
            };
            (name.to_string(), stats)
        })
        .collect();
    NormalizationRecord { stats }
}
