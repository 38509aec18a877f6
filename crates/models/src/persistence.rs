//! Persistence baseline: next month looks like the last observed month.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use drought_io::{Grid, GriddedSeries, IoError, WriterConfig, read_series, write_grid};
use drought_regions::{discover_truth, prediction_file_name};
use tracing::{debug, info, instrument};

use crate::error::ModelError;

/// Variable name of every saved prediction grid.
pub const PREDICTION_VARIABLE: &str = "preds";

/// Forecast of `target` at `time`: the last timestep of `x`.
///
/// # Errors
///
/// Returns [`IoError::MissingVariable`] if `x` lacks `target` and
/// [`IoError::DimensionMismatch`] if `x` has no timesteps.
pub fn persistence_forecast(
    x: &GriddedSeries,
    target: &str,
    time: NaiveDate,
) -> Result<Grid, IoError> {
    let last = x.grid(target, x.n_time().saturating_sub(1))?;
    Grid::new(time, x.lat().to_vec(), x.lon().to_vec(), last.values().clone())
}

/// Predicts every test example of an experiment with [`persistence_forecast`]
/// and writes `models/<experiment>/persistence/preds_<year>_<month>.parquet`.
#[derive(Debug, Clone)]
pub struct Persistence {
    test_dir: PathBuf,
    model_dir: PathBuf,
    config: WriterConfig,
}

impl Persistence {
    /// Model directory name.
    pub const NAME: &'static str = "persistence";

    /// Predictor over `<data_dir>/features/<experiment>/test`.
    pub fn new(data_dir: impl AsRef<Path>, experiment: &str) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            test_dir: data_dir.join("features").join(experiment).join("test"),
            model_dir: data_dir.join("models").join(experiment).join(Self::NAME),
            config: WriterConfig::default(),
        }
    }

    /// Sets the Parquet writer options.
    pub fn with_writer_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Where predictions are written.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Reads one example directory and returns its forecast.
    ///
    /// The target variable is the single variable of `y.parquet` and the
    /// forecast is stamped with `y`'s time.
    pub fn predict_example(example_dir: &Path) -> Result<Grid, ModelError> {
        let y_path = example_dir.join("y.parquet");
        let y = read_series(&y_path)?;
        let target = match y.variable_names().as_slice() {
            [only] => (*only).to_string(),
            names => {
                return Err(ModelError::AmbiguousTarget {
                    path: y_path,
                    found: names.len(),
                });
            }
        };
        let time = y.grid(&target, 0)?.time();
        let x = read_series(&example_dir.join("x.parquet"))?;
        Ok(persistence_forecast(&x, &target, time)?)
    }

    /// Predicts every test example and returns the written paths in target order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Region`] if the experiment has no test examples.
    /// Files written before a failure are kept.
    #[instrument(skip_all, fields(test_dir = %self.test_dir.display()))]
    pub fn predict(&self) -> Result<Vec<PathBuf>, ModelError> {
        let examples = discover_truth(&self.test_dir)?;
        std::fs::create_dir_all(&self.model_dir).map_err(|e| IoError::Io {
            path: self.model_dir.clone(),
            reason: e.to_string(),
        })?;

        let mut written = Vec::with_capacity(examples.len());
        for (target, y_path) in examples {
            let Some(dir) = y_path.parent() else {
                continue;
            };
            let forecast = Self::predict_example(dir)?;
            let path = self.model_dir.join(prediction_file_name(target));
            write_grid(&path, &forecast, PREDICTION_VARIABLE, &self.config)?;
            debug!(%target, path = %path.display(), "wrote persistence forecast");
            written.push(path);
        }
        info!(n = written.len(), dir = %self.model_dir.display(), "persistence predictions written");
        Ok(written)
    }
}
