//! Closed set of error metrics.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::MetricError;
use crate::functions;
use crate::mam30::mam30_ape;

/// Added to values before taking the logarithm or reciprocal.
pub const EPSILON: f64 = 1e-10;

/// Value transform applied to both series before the base function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    None,
    /// `ln(x + EPSILON)`
    Log,
    /// `1 / (x + EPSILON)`
    Inverse,
}

impl Transform {
    /// Applies the transform to one value.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Transform::None => x,
            Transform::Log => (x + EPSILON).ln(),
            Transform::Inverse => 1.0 / (x + EPSILON),
        }
    }

    fn apply_all(self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.apply(x)).collect()
    }
}

/// An error metric. Each variant fixes its transform and base function.
///
/// # Examples
///
/// ```
/// use drought_metrics::MetricKind;
///
/// let kind: MetricKind = "log_nse".parse().unwrap();
/// assert_eq!(kind, MetricKind::LogNse);
/// assert_eq!(kind.name(), "log_nse");
///
/// let obs = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(MetricKind::Rmse.evaluate(&obs, &obs).unwrap(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    Nse,
    Kge,
    Mse,
    Rmse,
    Mae,
    R2,
    Bias,
    AbsPctBias,
    Mape,
    LogNse,
    InvKge,
    Mam30Ape,
}

impl MetricKind {
    /// Every metric, in column order.
    pub const ALL: [MetricKind; 12] = [
        MetricKind::Nse,
        MetricKind::Kge,
        MetricKind::Mse,
        MetricKind::Rmse,
        MetricKind::Mae,
        MetricKind::R2,
        MetricKind::Bias,
        MetricKind::AbsPctBias,
        MetricKind::Mape,
        MetricKind::LogNse,
        MetricKind::InvKge,
        MetricKind::Mam30Ape,
    ];

    /// Default columns of a station error table.
    pub const STATION: [MetricKind; 10] = [
        MetricKind::Nse,
        MetricKind::Kge,
        MetricKind::Mse,
        MetricKind::Rmse,
        MetricKind::Bias,
        MetricKind::LogNse,
        MetricKind::InvKge,
        MetricKind::AbsPctBias,
        MetricKind::Mape,
        MetricKind::Mam30Ape,
    ];

    /// Snake-case column name, e.g. `"abs_pct_bias"`.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Nse => "nse",
            MetricKind::Kge => "kge",
            MetricKind::Mse => "mse",
            MetricKind::Rmse => "rmse",
            MetricKind::Mae => "mae",
            MetricKind::R2 => "r2",
            MetricKind::Bias => "bias",
            MetricKind::AbsPctBias => "abs_pct_bias",
            MetricKind::Mape => "mape",
            MetricKind::LogNse => "log_nse",
            MetricKind::InvKge => "inv_kge",
            MetricKind::Mam30Ape => "mam30_ape",
        }
    }

    /// Transform applied to both series before scoring.
    pub fn transform(self) -> Transform {
        match self {
            MetricKind::LogNse => Transform::Log,
            MetricKind::InvKge => Transform::Inverse,
            _ => Transform::None,
        }
    }

    /// Bias-type metrics are compared by magnitude when computing deltas.
    pub fn is_bias(self) -> bool {
        matches!(self, MetricKind::Bias | MetricKind::AbsPctBias)
    }

    /// Whether the metric needs the timestamps of the series.
    pub fn requires_dates(self) -> bool {
        matches!(self, MetricKind::Mam30Ape)
    }

    /// Computes the metric over an undated pair of series.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::RequiresDates`] for [`MetricKind::Mam30Ape`],
    /// or the base function's error for degenerate input.
    pub fn evaluate(self, obs: &[f64], sim: &[f64]) -> Result<f64, MetricError> {
        let transform = self.transform();
        let (obs, sim) = (transform.apply_all(obs), transform.apply_all(sim));
        match self {
            MetricKind::Nse | MetricKind::LogNse => functions::nse(&obs, &sim),
            MetricKind::Kge | MetricKind::InvKge => functions::kge(&obs, &sim),
            MetricKind::Mse => functions::mse(&obs, &sim),
            MetricKind::Rmse => functions::rmse(&obs, &sim),
            MetricKind::Mae => functions::mae(&obs, &sim),
            MetricKind::R2 => functions::r2(&obs, &sim),
            MetricKind::Bias => functions::bias(&obs, &sim),
            MetricKind::AbsPctBias => functions::abs_pct_bias(&obs, &sim),
            MetricKind::Mape => functions::mape(&obs, &sim),
            MetricKind::Mam30Ape => Err(MetricError::RequiresDates {
                metric: self.name(),
            }),
        }
    }

    /// Computes the metric over a dated series in time order.
    pub fn evaluate_dated(
        self,
        time: &[NaiveDate],
        obs: &[f64],
        sim: &[f64],
    ) -> Result<f64, MetricError> {
        match self {
            MetricKind::Mam30Ape => mam30_ape(time, obs, sim),
            _ => self.evaluate(obs, sim),
        }
    }

    /// Like [`evaluate_dated`](Self::evaluate_dated) but a failure becomes `NaN`.
    pub fn score(self, time: &[NaiveDate], obs: &[f64], sim: &[f64]) -> f64 {
        match self.evaluate_dated(time, obs, sim) {
            Ok(value) => value,
            Err(e) => {
                debug!(metric = self.name(), error = %e, "metric undefined, recording NaN");
                f64::NAN
            }
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or(MetricError::UnknownMetric {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_every_name() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.name().parse::<MetricKind>().unwrap(), kind);
        }
        assert_eq!("NSE".parse::<MetricKind>().unwrap(), MetricKind::Nse);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "nash".parse::<MetricKind>().unwrap_err();
        assert!(matches!(err, MetricError::UnknownMetric { name } if name == "nash"));
    }

    #[test]
    fn test_transforms() {
        assert_eq!(MetricKind::LogNse.transform(), Transform::Log);
        assert_eq!(MetricKind::InvKge.transform(), Transform::Inverse);
        assert_eq!(MetricKind::Nse.transform(), Transform::None);
        assert_relative_eq!(Transform::Log.apply(1.0), 1e-10, epsilon = 1e-15);
        assert!(Transform::Inverse.apply(0.0).is_finite());
    }

    #[test]
    fn test_log_nse_drops_negative_values() {
        // ln of a negative value is NaN and the pair is removed
        let obs = [-1.0, 1.0, 2.0, 3.0];
        let sim = [5.0, 1.0, 2.0, 3.0];
        assert_relative_eq!(MetricKind::LogNse.evaluate(&obs, &sim).unwrap(), 1.0);
    }

    #[test]
    fn test_mam30_needs_dates() {
        let err = MetricKind::Mam30Ape.evaluate(&[1.0], &[1.0]).unwrap_err();
        assert!(matches!(err, MetricError::RequiresDates { .. }));
    }

    #[test]
    fn test_score_failure_is_nan() {
        let obs = [3.0; 5];
        let sim = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(MetricKind::Nse.score(&[], &obs, &sim).is_nan());
        assert_relative_eq!(MetricKind::Mse.score(&[], &obs, &sim), 2.0);
    }

    #[test]
    fn test_bias_kinds() {
        let bias: Vec<_> = MetricKind::ALL.into_iter().filter(|k| k.is_bias()).collect();
        assert_eq!(bias, vec![MetricKind::Bias, MetricKind::AbsPctBias]);
    }
}
