//! Train/test partitioning.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use drought_calendar::YearMonth;
use drought_io::GriddedSeries;
use tracing::{debug, info, warn};

use crate::error::EngineerError;
use crate::stratify::{DatasetType, Stratifier};
use crate::writer::ExampleSink;

/// Target dates saved by one pass and the number of windows dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    /// Target date of every saved example, in save order.
    pub dates: Vec<NaiveDate>,
    /// Windows returned as `None` (incomplete history or no single target step).
    pub skipped: usize,
}

impl SplitOutcome {
    fn record_test(
        &mut self,
        strat: &Stratifier<'_>,
        target: YearMonth,
        sink: &mut dyn ExampleSink,
    ) -> Result<(), EngineerError> {
        match strat.stratify(target, DatasetType::Test)?.0 {
            Some(example) => {
                self.dates.push(example.target_date());
                sink.save(&example)?;
            }
            None => self.skipped += 1,
        }
        Ok(())
    }
}

/// Saves a test example for every month of every test year.
///
/// When the dataset starts in the first test year, that year starts at
/// `first_month + pred_months` because earlier targets lack history.
///
/// # Errors
///
/// Propagates stratification and sink errors.
#[tracing::instrument(skip_all, fields(test_years = ?test_years))]
pub fn year_train_test_split(
    strat: &Stratifier<'_>,
    test_years: &[i32],
    sink: &mut dyn ExampleSink,
) -> Result<SplitOutcome, EngineerError> {
    let mut years = test_years.to_vec();
    years.sort_unstable();
    years.dedup();

    let first = strat.dataset().min_time().ok_or(EngineerError::EmptyDataset)?;
    let mut outcome = SplitOutcome::default();

    for (i, &year) in years.iter().enumerate() {
        let start_month = if i == 0 && first.year() == year {
            let init = first.month().saturating_add(strat.pred_months());
            info!(year, init_target_month = init, "first test year starts the dataset");
            init
        } else {
            1
        };
        if start_month > 12 {
            warn!(year, start_month, "no month of this test year has enough history");
            continue;
        }
        for month in start_month..=12 {
            outcome.record_test(strat, YearMonth::new(year, month as u8)?, sink)?;
        }
    }

    debug!(n_test = outcome.dates.len(), skipped = outcome.skipped, "test split done");
    Ok(outcome)
}

/// Saves a test example for every listed month.
///
/// # Errors
///
/// Propagates stratification and sink errors.
#[tracing::instrument(skip_all, fields(n_timesteps = test.len()))]
pub fn timestep_train_test_split(
    strat: &Stratifier<'_>,
    test: &[YearMonth],
    sink: &mut dyn ExampleSink,
) -> Result<SplitOutcome, EngineerError> {
    let mut outcome = SplitOutcome::default();
    for &target in test {
        outcome.record_test(strat, target, sink)?;
    }
    debug!(n_test = outcome.dates.len(), skipped = outcome.skipped, "test split done");
    Ok(outcome)
}

/// Walks backward from the dataset's last month to its first, saving a
/// training example for every target month accepted by `allow` whose target
/// date is not a test date.
///
/// # Errors
///
/// Propagates stratification and sink errors.
#[tracing::instrument(skip_all, fields(n_test = test_dates.len()))]
pub fn stratify_training_data(
    strat: &Stratifier<'_>,
    test_dates: &BTreeSet<NaiveDate>,
    allow: &dyn Fn(YearMonth) -> bool,
    sink: &mut dyn ExampleSink,
) -> Result<SplitOutcome, EngineerError> {
    let ds = strat.dataset();
    let (Some(min_date), Some(max_date)) = (ds.min_time(), ds.max_time()) else {
        return Err(EngineerError::EmptyDataset);
    };

    let mut outcome = SplitOutcome::default();
    let mut cursor = max_date;
    while cursor >= min_date {
        let target = YearMonth::from_date(cursor)?;
        let (example, next) = strat.stratify(target, DatasetType::Train)?;
        match example {
            Some(example) => {
                let date = example.target_date();
                if allow(target) && !test_dates.contains(&date) {
                    outcome.dates.push(date);
                    sink.save(&example)?;
                }
            }
            None => outcome.skipped += 1,
        }
        cursor = next;
    }

    debug!(n_train = outcome.dates.len(), skipped = outcome.skipped, "training split done");
    Ok(outcome)
}

/// Verifies that no test target date is also a training target date.
///
/// # Errors
///
/// Returns [`EngineerError::DataLeakage`] naming the first shared date.
pub fn check_data_leakage(
    train_dates: &[NaiveDate],
    test_dates: &[NaiveDate],
) -> Result<(), EngineerError> {
    let train: BTreeSet<&NaiveDate> = train_dates.iter().collect();
    match test_dates.iter().find(|d| train.contains(d)) {
        Some(&date) => Err(EngineerError::DataLeakage { date }),
        None => Ok(()),
    }
}

/// The dataset minus every test target step and, when given, every step in
/// a test year. Normalization statistics are computed from this.
///
/// # Errors
///
/// Returns [`EngineerError::EmptyTrainingSet`] if nothing remains.
pub fn training_partition(
    ds: &GriddedSeries,
    test_dates: &BTreeSet<NaiveDate>,
    test_years: Option<&[i32]>,
) -> Result<GriddedSeries, EngineerError> {
    let partition = ds.select_time(|d| {
        !test_dates.contains(&d) && test_years.is_none_or(|ys| !ys.contains(&d.year()))
    });
    if partition.is_empty() {
        return Err(EngineerError::EmptyTrainingSet {
            n_test: test_dates.len(),
        });
    }
    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineerConfig, SplitStrategy};
    use crate::writer::MemorySink;
    use ndarray::Array3;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn leakage_detected() {
        let err = check_data_leakage(&[d(2000, 1, 31), d(2000, 2, 29)], &[d(2000, 2, 29)]).unwrap_err();
        assert!(matches!(err, EngineerError::DataLeakage { date } if date == d(2000, 2, 29)));
    }

    #[test]
    fn no_leakage() {
        assert!(check_data_leakage(&[d(2000, 1, 31)], &[d(2001, 1, 31)]).is_ok());
        assert!(check_data_leakage(&[], &[]).is_ok());
    }

    #[test]
    fn oversized_horizon_skips_first_test_year() {
        let start = YearMonth::new(2000, 1).unwrap();
        let time = (0..12).map(|i| start.plus_months(i).unwrap().last_day()).collect();
        let ds = GriddedSeries::new(time, vec![0.0], vec![0.0])
            .unwrap()
            .with_variable("VHI", Array3::zeros((12, 1, 1)))
            .unwrap();
        let cfg = EngineerConfig::new(SplitStrategy::test_years(vec![2000])).with_pred_months(u32::MAX);
        let strat = Stratifier::new(&ds, &cfg);
        let mut sink = MemorySink::default();

        let outcome = year_train_test_split(&strat, &[2000], &mut sink).unwrap();
        assert!(outcome.dates.is_empty());
        assert!(sink.examples.is_empty());
    }
}
