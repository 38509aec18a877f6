//! Error types for the drought-engineer crate.

use std::path::PathBuf;

use drought_calendar::CalendarError;
use drought_io::IoError;

/// Error type for all fallible operations in the drought-engineer crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineerError {
    /// Returned when an engineering parameter is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the input dataset holds no timesteps.
    #[error("input dataset is empty")]
    EmptyDataset,

    /// Returned when removing the test partition leaves nothing to train on.
    #[error("no training timesteps remain after removing {n_test} test target(s)")]
    EmptyTrainingSet {
        /// Number of test targets removed.
        n_test: usize,
    },

    /// Returned when a training target date is also a test target date.
    #[error("data leakage: test target {date} is also a training target")]
    DataLeakage {
        /// The offending target date.
        date: chrono::NaiveDate,
    },

    /// Wraps grid or file errors from drought-io.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Wraps month arithmetic errors.
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Returned when the normalization record cannot be written or read.
    #[error("normalization file {}: {reason}", path.display())]
    Normalization {
        /// Path of the JSON file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_config() {
        let err = EngineerError::InvalidConfig {
            reason: "pred_months must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: pred_months must be at least 1"
        );
    }

    #[test]
    fn display_empty_training_set() {
        let err = EngineerError::EmptyTrainingSet { n_test: 12 };
        assert_eq!(
            err.to_string(),
            "no training timesteps remain after removing 12 test target(s)"
        );
    }

    #[test]
    fn display_leakage() {
        let err = EngineerError::DataLeakage {
            date: chrono::NaiveDate::from_ymd_opt(2001, 3, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "data leakage: test target 2001-03-31 is also a training target"
        );
    }

    #[test]
    fn io_is_transparent() {
        let err: EngineerError = IoError::FileNotFound {
            path: PathBuf::from("/x.parquet"),
        }
        .into();
        assert_eq!(err.to_string(), "file not found: /x.parquet");
    }

    #[test]
    fn calendar_wrapped() {
        let err: EngineerError = CalendarError::InvalidMonth { month: 13 }.into();
        assert_eq!(
            err.to_string(),
            "calendar error: invalid month: 13 (must be 1..=12)"
        );
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<EngineerError>();
    }
}
