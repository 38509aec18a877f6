//! Mean annual minimum of the 30-day moving average (MAM30).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use drought_calendar::hydrological_water_year;
use drought_stats::{nan_mean, rolling_mean};

use crate::error::MetricError;

/// Rolling window length in timesteps (days for daily series).
pub const WINDOW: usize = 30;

/// Minimum number of water years: the first and last are discarded as partial.
pub const MIN_WATER_YEARS: usize = 3;

/// MAM30 of a single dated series.
///
/// The series must be in time order. The 30-step trailing mean is grouped by
/// October water year, the minimum taken per year, the first and last water
/// years dropped and the remaining minima averaged.
pub fn mam30(time: &[NaiveDate], values: &[f64]) -> Result<f64, MetricError> {
    if time.len() != values.len() {
        return Err(MetricError::LengthMismatch {
            obs: time.len(),
            sim: values.len(),
        });
    }
    let smoothed = rolling_mean(values, WINDOW);

    let mut minima: BTreeMap<i32, f64> = BTreeMap::new();
    for (date, value) in time.iter().zip(smoothed) {
        let entry = minima.entry(hydrological_water_year(*date)).or_insert(f64::NAN);
        if value.is_finite() && (entry.is_nan() || value < *entry) {
            *entry = value;
        }
    }
    if minima.len() < MIN_WATER_YEARS {
        return Err(MetricError::InsufficientWaterYears {
            found: minima.len(),
            required: MIN_WATER_YEARS,
        });
    }

    let inner: Vec<f64> = minima
        .values()
        .skip(1)
        .take(minima.len() - 2)
        .copied()
        .collect();
    Ok(nan_mean(&inner))
}

/// Absolute percentage error of the simulated MAM30, `|obs - sim| / obs * 100`.
pub fn mam30_ape(time: &[NaiveDate], obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    if obs.len() != sim.len() {
        return Err(MetricError::LengthMismatch {
            obs: obs.len(),
            sim: sim.len(),
        });
    }
    let mam_obs = mam30(time, obs)?;
    let mam_sim = mam30(time, sim)?;
    let ape = ((mam_obs - mam_sim) / mam_obs).abs() * 100.0;
    if !ape.is_finite() {
        return Err(MetricError::Undefined {
            metric: "mam30_ape",
            reason: format!("observed MAM30 is {mam_obs}"),
        });
    }
    Ok(ape)
}
