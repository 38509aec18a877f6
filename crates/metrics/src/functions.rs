//! Base error functions over paired observed / simulated series.
//!
//! Every function drops the positions where either value is non-finite
//! before computing, and reports degenerate input as a [`MetricError`]
//! instead of returning a meaningless number.

use drought_stats::{finite_pairs, mean, pearson_correlation, std};

use crate::error::MetricError;

fn pairs(metric: &'static str, obs: &[f64], sim: &[f64]) -> Result<(Vec<f64>, Vec<f64>), MetricError> {
    if obs.len() != sim.len() {
        return Err(MetricError::LengthMismatch {
            obs: obs.len(),
            sim: sim.len(),
        });
    }
    let (o, s) = finite_pairs(obs, sim);
    if o.is_empty() {
        return Err(MetricError::EmptySeries { metric });
    }
    Ok((o, s))
}

fn sse(obs: &[f64], sim: &[f64]) -> f64 {
    obs.iter().zip(sim).map(|(o, s)| (o - s) * (o - s)).sum()
}

/// Nash-Sutcliffe efficiency, `1 - SSE / SS_tot`.
pub fn nse(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    efficiency("nse", obs, sim)
}

/// Coefficient of determination in the `1 - SSE / SS_tot` form used for
/// regional summaries. Numerically the same as [`nse`].
pub fn r2(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    efficiency("r2", obs, sim)
}

fn efficiency(metric: &'static str, obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs(metric, obs, sim)?;
    let m = mean(&o);
    let ss_tot: f64 = o.iter().map(|x| (x - m) * (x - m)).sum();
    if ss_tot == 0.0 {
        return Err(MetricError::Undefined {
            metric,
            reason: "constant observations".to_string(),
        });
    }
    Ok(1.0 - sse(&o, &s) / ss_tot)
}

/// Mean squared error.
pub fn mse(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs("mse", obs, sim)?;
    Ok(sse(&o, &s) / o.len() as f64)
}

/// Root mean squared error.
pub fn rmse(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs("rmse", obs, sim)?;
    Ok((sse(&o, &s) / o.len() as f64).sqrt())
}

/// Mean absolute error.
pub fn mae(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs("mae", obs, sim)?;
    Ok(o.iter().zip(&s).map(|(a, b)| (a - b).abs()).sum::<f64>() / o.len() as f64)
}

/// Kling-Gupta efficiency (2009):
/// `1 - sqrt((r - 1)^2 + (alpha - 1)^2 + (beta - 1)^2)` with `alpha` the
/// ratio of standard deviations and `beta` the ratio of means.
pub fn kge(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs("kge", obs, sim)?;
    let r = pearson_correlation(&o, &s).ok_or_else(|| MetricError::Undefined {
        metric: "kge",
        reason: "correlation needs 3 or more non-constant pairs".to_string(),
    })?;
    let obs_mean = mean(&o);
    if obs_mean == 0.0 {
        return Err(MetricError::Undefined {
            metric: "kge",
            reason: "zero mean observation".to_string(),
        });
    }
    let alpha = std(&s, 0) / std(&o, 0);
    let beta = mean(&s) / obs_mean;
    Ok(1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt())
}

/// Percentage bias of the simulated mean, `100 (mean(sim) - mean(obs)) / mean(obs)`.
pub fn bias(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    percent_bias("bias", obs, sim)
}

/// Absolute value of [`bias`].
pub fn abs_pct_bias(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    percent_bias("abs_pct_bias", obs, sim).map(f64::abs)
}

fn percent_bias(metric: &'static str, obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs(metric, obs, sim)?;
    let obs_mean = mean(&o);
    if obs_mean == 0.0 {
        return Err(MetricError::Undefined {
            metric,
            reason: "zero mean observation".to_string(),
        });
    }
    Ok(100.0 * (mean(&s) - obs_mean) / obs_mean)
}

/// Mean absolute percentage error, `100 mean(|(obs - sim) / obs|)`.
pub fn mape(obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
    let (o, s) = pairs("mape", obs, sim)?;
    if o.contains(&0.0) {
        return Err(MetricError::Undefined {
            metric: "mape",
            reason: "zero observation".to_string(),
        });
    }
    let total: f64 = o.iter().zip(&s).map(|(a, b)| ((a - b) / a).abs()).sum();
    Ok(100.0 * total / o.len() as f64)
}
