//! Error types for drought-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the drought-io crate.
///
/// Covers I/O failures, format-specific errors from Parquet and NetCDF,
/// coordinate and shape mismatches between grids, and malformed region
/// mask metadata.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps a filesystem error.
    #[error("i/o error on {}: {reason}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Wraps an error originating from the NetCDF library.
    #[cfg(feature = "netcdf")]
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying Parquet failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable or column is not present.
    #[error("variable '{name}' not found in {source_name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// File path or container description that was inspected.
        source_name: String,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a requested coordinate is absent from a grid.
    #[error("coordinate {axis}={value} not present in {context}")]
    CoordinateMismatch {
        /// Axis name (`lat`, `lon` or `time`).
        axis: String,
        /// The coordinate value that could not be matched.
        value: String,
        /// Which grid was searched.
        context: String,
    },

    /// Returned when region mask metadata is malformed.
    #[error("region mask schema violation in '{label}': {reason}")]
    RegionSchema {
        /// Label of the mask (file stem).
        label: String,
        /// What is wrong with the `keys`/`values` metadata.
        reason: String,
    },

    /// Returned when a time value cannot be parsed or is out of range.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },
}

#[cfg(feature = "netcdf")]
impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl IoError {
    pub(crate) fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        IoError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.parquet"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.parquet");
    }

    #[test]
    fn display_parquet() {
        let err = IoError::Parquet {
            reason: "corrupt footer".to_string(),
        };
        assert_eq!(err.to_string(), "parquet error: corrupt footer");
    }

    #[test]
    fn display_missing_variable() {
        let err = IoError::MissingVariable {
            name: "VHI".to_string(),
            source_name: "/data/y.parquet".to_string(),
        };
        assert_eq!(err.to_string(), "variable 'VHI' not found in /data/y.parquet");
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = IoError::DimensionMismatch {
            name: "lat".to_string(),
            expected: 30,
            got: 29,
        };
        assert_eq!(err.to_string(), "dimension 'lat' mismatch: expected 30, got 29");
    }

    #[test]
    fn display_coordinate_mismatch() {
        let err = IoError::CoordinateMismatch {
            axis: "lon".to_string(),
            value: "35.5".to_string(),
            context: "truth grid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "coordinate lon=35.5 not present in truth grid"
        );
    }

    #[test]
    fn display_region_schema() {
        let err = IoError::RegionSchema {
            label: "province_l1_kenya".to_string(),
            reason: "3 keys but 2 values".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "region mask schema violation in 'province_l1_kenya': 3 keys but 2 values"
        );
    }

    #[test]
    fn display_validation() {
        let err = IoError::Validation {
            count: 2,
            details: "time not increasing; empty lat".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "2 validation error(s): time not increasing; empty lat"
        );
    }

    #[test]
    fn from_parquet_error() {
        let pq_err = parquet::errors::ParquetError::General("test pq error".to_string());
        let err: IoError = pq_err.into();
        assert!(matches!(err, IoError::Parquet { .. }));
        assert!(err.to_string().contains("test pq error"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
