//! End-to-end engineering run.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use drought_calendar::YearMonth;
use drought_io::GriddedSeries;
use tracing::{info, warn};

use crate::config::{EngineerConfig, SplitStrategy};
use crate::error::EngineerError;
use crate::normalize::{NormalizationRecord, calculate_normalization_values};
use crate::split::{
    SplitOutcome, check_data_leakage, stratify_training_data, timestep_train_test_split, training_partition,
    year_train_test_split,
};
use crate::stratify::Stratifier;
use crate::writer::ExampleSink;

/// Summary of an engineering run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineerReport {
    /// Target dates of saved test examples.
    pub test_dates: Vec<NaiveDate>,
    /// Target dates of saved training examples (newest first).
    pub train_dates: Vec<NaiveDate>,
    /// Candidate windows dropped as incomplete.
    pub skipped: usize,
    /// Statistics saved alongside the examples.
    pub normalization: NormalizationRecord,
}

/// Stratifies `ds` into test and training examples, computes normalization
/// statistics from the training partition and hands everything to `sink`.
///
/// Test examples are saved first; their target dates are then excluded from
/// both the training examples and the normalization statistics.
///
/// # Errors
///
/// Returns [`EngineerError::InvalidConfig`] for a bad configuration,
/// [`EngineerError::EmptyDataset`] / [`EngineerError::EmptyTrainingSet`] if
/// there is nothing to work with, and propagates I/O errors from the sink.
#[tracing::instrument(skip_all, fields(target = config.target_variable(), pred_months = config.pred_months()))]
pub fn engineer(
    ds: &GriddedSeries,
    config: &EngineerConfig,
    sink: &mut dyn ExampleSink,
) -> Result<EngineerReport, EngineerError> {
    config.validate()?;
    if ds.is_empty() {
        return Err(EngineerError::EmptyDataset);
    }
    ds.require(config.target_variable())?;
    if config.expected_length().is_none() {
        warn!("expected_length is None: windows with missing months will not be skipped");
    }

    let strat = Stratifier::new(ds, config);

    type Allow<'a> = Box<dyn Fn(YearMonth) -> bool + 'a>;
    let (test, test_years, allow): (SplitOutcome, Option<&[i32]>, Allow<'_>) =
        match config.split() {
            SplitStrategy::Years {
                test_years,
                train_years,
            } => {
                let test = year_train_test_split(&strat, test_years, sink)?;
                let allow: Allow<'_> = match train_years {
                    Some(train) => Box::new(move |t: YearMonth| train.contains(&t.year())),
                    None => Box::new(move |t: YearMonth| !test_years.contains(&t.year())),
                };
                (test, Some(test_years.as_slice()), allow)
            }
            SplitStrategy::Timesteps { test, train } => {
                let outcome = timestep_train_test_split(&strat, test, sink)?;
                let allow: Allow<'_> = match train {
                    Some(train) => Box::new(move |t: YearMonth| train.contains(&t)),
                    None => Box::new(|_: YearMonth| true),
                };
                (outcome, None, allow)
            }
        };

    let test_set: BTreeSet<NaiveDate> = test.dates.iter().copied().collect();
    let partition = training_partition(ds, &test_set, test_years)?;
    let normalization = calculate_normalization_values(&partition);

    let train = stratify_training_data(&strat, &test_set, allow.as_ref(), sink)?;
    check_data_leakage(&train.dates, &test.dates)?;

    sink.save_normalization(&normalization)?;

    info!(
        n_test = test.dates.len(),
        n_train = train.dates.len(),
        skipped = test.skipped + train.skipped,
        first_train_year = train.dates.last().map(|d| d.year()),
        "engineering complete"
    );

    Ok(EngineerReport {
        test_dates: test.dates,
        train_dates: train.dates,
        skipped: test.skipped + train.skipped,
        normalization,
    })
}
