//! Error types for the drought-regions crate.

use std::path::PathBuf;

use drought_io::IoError;

/// Error type for regional aggregation and the analysis driver.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// An upstream stage produced no files.
    #[error("no {stage} found in {} (has the pipeline been run?)", path.display())]
    MissingInput { stage: &'static str, path: PathBuf },

    /// Grids passed to an aggregation do not share coordinates.
    #[error("misaligned grids: {what}")]
    Misaligned { what: String },

    /// Models produced different numbers of rows for the same boundary set.
    #[error("model '{model}' has {got} rows for '{label}', expected {expected}")]
    Cardinality {
        model: String,
        label: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Io(#[from] IoError),

    /// Writing a result table failed.
    #[error("failed to write {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}

pub(crate) fn output_error(path: &std::path::Path, e: impl std::fmt::Display) -> RegionError {
    RegionError::Output {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_input() {
        let err = RegionError::MissingInput {
            stage: "region boundaries",
            path: PathBuf::from("data/analysis/boundaries_preprocessed"),
        };
        let msg = err.to_string();
        assert!(msg.contains("no region boundaries"));
        assert!(msg.contains("boundaries_preprocessed"));
        assert!(msg.contains("pipeline been run"));
    }

    #[test]
    fn display_cardinality() {
        let err = RegionError::Cardinality {
            model: "linear_regression".to_string(),
            label: "province_l1_kenya".to_string(),
            expected: 9,
            got: 6,
        };
        assert_eq!(
            err.to_string(),
            "model 'linear_regression' has 6 rows for 'province_l1_kenya', expected 9"
        );
    }

    #[test]
    fn io_is_transparent() {
        let inner = IoError::FileNotFound {
            path: PathBuf::from("y.parquet"),
        };
        let expected = inner.to_string();
        assert_eq!(RegionError::from(inner).to_string(), expected);
    }
}
