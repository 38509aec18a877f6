//! Error types for the drought-models crate.

use std::path::PathBuf;

use drought_io::IoError;
use drought_regions::RegionError;

/// Error type for all fallible operations in the drought-models crate.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when a batch size of zero is requested.
    #[error("batch_size must be >= 1, got {batch_size}")]
    InvalidBatchSize {
        /// The invalid batch size.
        batch_size: usize,
    },

    /// Returned when no input arrays are given.
    #[error("at least one x input is required")]
    NoInputs,

    /// Returned when an input and the targets disagree on the number of samples.
    #[error("x input {index} has {found} samples but y has {expected}")]
    SampleMismatch {
        /// Position of the offending array in `xs`.
        index: usize,
        /// Length of its first axis.
        found: usize,
        /// Length of the first axis of `y`.
        expected: usize,
    },

    /// Returned when a zero-dimensional array is passed for chunking.
    #[error("cannot chunk a zero-dimensional array")]
    ZeroDimensional,

    /// Returned when a target file does not hold exactly one variable.
    #[error("{} holds {found} variables, expected a single target", path.display())]
    AmbiguousTarget {
        /// Path of the `y` file.
        path: PathBuf,
        /// Number of variables found.
        found: usize,
    },

    /// Wraps grid or file errors from drought-io.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Wraps discovery errors from drought-regions.
    #[error(transparent)]
    Region(#[from] RegionError),
}
