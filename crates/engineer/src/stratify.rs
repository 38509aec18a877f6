//! Single-target input/output windows.

use std::fmt;

use chrono::NaiveDate;
use drought_calendar::YearMonth;
use drought_io::GriddedSeries;
use tracing::trace;

use crate::config::EngineerConfig;
use crate::error::EngineerError;

/// Partition an example belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetType {
    /// Used for fitting models.
    Train,
    /// Held out for evaluation.
    Test,
}

impl DatasetType {
    /// Directory name, `"train"` or `"test"`.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetType::Train => "train",
            DatasetType::Test => "test",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forecasting example: `pred_months` of inputs and a single target step.
#[derive(Debug, Clone, PartialEq)]
pub struct StratifiedExample {
    /// Input window, all variables.
    pub x: GriddedSeries,
    /// Target step, target variable only.
    pub y: GriddedSeries,
    /// Month being forecast.
    pub target: YearMonth,
    /// Partition the example was produced for.
    pub dataset_type: DatasetType,
}

impl StratifiedExample {
    /// Timestamp of the single target step.
    pub fn target_date(&self) -> NaiveDate {
        // y always holds exactly one step; see `stratify`.
        self.y.time()[0]
    }
}

/// Builds the example whose target is `target`.
///
/// `x` holds every timestep in the `pred_months` calendar months before the
/// target month, `y` the timestep(s) inside the target month restricted to
/// `target_variable`. Returns `None` for the example when `y` does not hold
/// exactly one step or, with `expected_length` set, `x` has a different
/// length. The returned cursor is always the last day of the month before
/// `target`, so callers walking backwards advance one month per call.
///
/// # Errors
///
/// Returns [`EngineerError::Io`] if `target_variable` is absent and
/// [`EngineerError::Calendar`] if the window leaves the representable range.
pub fn stratify(
    ds: &GriddedSeries,
    target: YearMonth,
    target_variable: &str,
    pred_months: u32,
    expected_length: Option<usize>,
    dataset_type: DatasetType,
) -> Result<(Option<StratifiedExample>, NaiveDate), EngineerError> {
    let prev = target.prev()?;
    let max_train_date = prev.last_day();
    let min_date = prev.minus_months(pred_months)?.last_day();

    let y = ds
        .select_range(max_train_date, target.last_day())
        .select_variables(&[target_variable])?;
    if y.n_time() != 1 {
        trace!(%target, n_y = y.n_time(), "no single target step");
        return Ok((None, max_train_date));
    }

    let x = ds.select_range(min_date, max_train_date);
    if let Some(expected) = expected_length
        && x.n_time() != expected
    {
        trace!(%target, n_x = x.n_time(), expected, "incomplete input window");
        return Ok((None, max_train_date));
    }

    Ok((
        Some(StratifiedExample {
            x,
            y,
            target,
            dataset_type,
        }),
        max_train_date,
    ))
}

/// [`stratify`] bound to one dataset and configuration.
#[derive(Debug, Clone, Copy)]
pub struct Stratifier<'a> {
    ds: &'a GriddedSeries,
    target_variable: &'a str,
    pred_months: u32,
    expected_length: Option<usize>,
}

impl<'a> Stratifier<'a> {
    /// Binds `ds` to the window parameters of `config`.
    pub fn new(ds: &'a GriddedSeries, config: &'a EngineerConfig) -> Self {
        Self {
            ds,
            target_variable: config.target_variable(),
            pred_months: config.pred_months(),
            expected_length: config.expected_length(),
        }
    }

    /// The bound dataset.
    pub fn dataset(&self) -> &'a GriddedSeries {
        self.ds
    }

    /// Number of history months.
    pub fn pred_months(&self) -> u32 {
        self.pred_months
    }

    /// See [`stratify`].
    ///
    /// # Errors
    ///
    /// See [`stratify`].
    pub fn stratify(
        &self,
        target: YearMonth,
        dataset_type: DatasetType,
    ) -> Result<(Option<StratifiedExample>, NaiveDate), EngineerError> {
        stratify(
            self.ds,
            target,
            self.target_variable,
            self.pred_months,
            self.expected_length,
            dataset_type,
        )
    }
}
