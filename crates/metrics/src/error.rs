//! Metric error types.

use std::path::PathBuf;

/// Errors that can occur while computing or tabulating metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// No finite (obs, sim) pairs were left after filtering.
    #[error("{metric}: no finite observation/simulation pairs")]
    EmptySeries { metric: &'static str },

    /// The metric is numerically undefined for this input.
    #[error("{metric} is undefined: {reason}")]
    Undefined {
        metric: &'static str,
        reason: String,
    },

    /// Observation, simulation (and time) columns differ in length.
    #[error("length mismatch: {obs} observations, {sim} simulations")]
    LengthMismatch { obs: usize, sim: usize },

    /// A metric name did not parse.
    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    /// Too few complete water years for the low-flow statistic.
    #[error("need at least {required} water years, found {found}")]
    InsufficientWaterYears { found: usize, required: usize },

    /// MAM30 needs the timestamps of the series.
    #[error("{metric} requires a dated series")]
    RequiresDates { metric: &'static str },

    /// The reference model for deltas is absent.
    #[error("reference model '{model}' not found among {available:?}")]
    MissingReference {
        model: String,
        available: Vec<String>,
    },

    /// CSV reading or writing failed.
    #[error("CSV error in {}: {reason}", path.display())]
    Csv { path: PathBuf, reason: String },

    /// File system error.
    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_display() {
        let err = MetricError::Undefined {
            metric: "nse",
            reason: "constant observations".to_string(),
        };
        assert_eq!(err.to_string(), "nse is undefined: constant observations");
    }

    #[test]
    fn test_empty_series_display() {
        let err = MetricError::EmptySeries { metric: "kge" };
        assert!(err.to_string().contains("kge"));
        assert!(err.to_string().contains("no finite"));
    }

    #[test]
    fn test_unknown_metric_display() {
        let err = MetricError::UnknownMetric {
            name: "nsee".to_string(),
        };
        assert_eq!(err.to_string(), "unknown metric 'nsee'");
    }

    #[test]
    fn test_water_years_display() {
        let err = MetricError::InsufficientWaterYears {
            found: 2,
            required: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("at least 3"));
        assert!(msg.contains("found 2"));
    }

    #[test]
    fn test_missing_reference_display() {
        let err = MetricError::MissingReference {
            model: "LSTM".to_string(),
            available: vec!["EALSTM".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'LSTM'"));
        assert!(msg.contains("EALSTM"));
    }

    #[test]
    fn test_csv_display() {
        let err = MetricError::Csv {
            path: PathBuf::from("/tmp/preds.csv"),
            reason: "bad row".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/preds.csv"));
        assert!(msg.contains("bad row"));
    }
}
