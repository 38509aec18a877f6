//! High-level Parquet writer configuration and orchestration.

use std::path::Path;

use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::error::IoError;
use crate::grid::{Grid, GriddedSeries};
use crate::mask::RegionMask;
use crate::parquet_write::{self, KEYS_METADATA, VALUES_METADATA};

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => {
                let level = parquet::basic::ZstdLevel::try_new(3)?;
                parquet::basic::Compression::ZSTD(level)
            }
        })
    }
}

/// Configuration for writing grids and masks to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression algorithm to use.
    compression: Compression,
    /// Maximum number of rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Returns the compression algorithm.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn properties(&self, metadata: Option<Vec<KeyValue>>) -> Result<WriterProperties, IoError> {
        self.validate()?;
        Ok(WriterProperties::builder()
            .set_compression(self.compression.to_parquet()?)
            .set_max_row_group_size(self.row_group_size)
            .set_key_value_metadata(metadata)
            .build())
    }
}

/// Writes a gridded series in long layout. An existing file is replaced.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, or
/// [`IoError::Parquet`] / [`IoError::Io`] if encoding or file I/O fails.
pub fn write_series(
    path: &Path,
    series: &GriddedSeries,
    config: &WriterConfig,
) -> Result<(), IoError> {
    let props = config.properties(None)?;
    let schema = parquet_write::build_series_schema(series);
    let batch = parquet_write::series_to_record_batch(series, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, props)?;
    debug!(
        path = %path.display(),
        shape = ?series.shape(),
        variables = ?series.variable_names(),
        "wrote gridded series"
    );
    Ok(())
}

/// Writes a single field as a one-step series holding `variable`.
///
/// # Errors
///
/// See [`write_series`].
pub fn write_grid(
    path: &Path,
    grid: &Grid,
    variable: &str,
    config: &WriterConfig,
) -> Result<(), IoError> {
    write_series(path, &grid.clone().into_series(variable)?, config)
}

/// Writes a region mask with its `keys` / `values` lookup as file metadata.
///
/// # Errors
///
/// See [`write_series`].
pub fn write_region_mask(
    path: &Path,
    mask: &RegionMask,
    config: &WriterConfig,
) -> Result<(), IoError> {
    let metadata = vec![
        KeyValue::new(KEYS_METADATA.to_string(), mask.lookup().keys_attr()),
        KeyValue::new(VALUES_METADATA.to_string(), mask.lookup().values_attr()),
    ];
    let props = config.properties(Some(metadata))?;
    let schema = parquet_write::build_mask_schema();
    let batch = parquet_write::mask_to_record_batch(mask, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, props)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = WriterConfig::default();
        assert_eq!(config.compression, Compression::Snappy);
        assert_eq!(config.row_group_size, 1_000_000);
    }

    #[test]
    fn builder_methods() {
        let config = WriterConfig::default()
            .with_compression(Compression::Zstd)
            .with_row_group_size(500);
        assert_eq!(config.compression(), Compression::Zstd);
        assert_eq!(config.row_group_size, 500);
    }

    #[test]
    fn validate_zero_row_group_size() {
        let config = WriterConfig::default().with_row_group_size(0);
        match config.validate().unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 1);
                assert!(details.contains("row_group_size"));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn zstd_properties_build() {
        let config = WriterConfig::default().with_compression(Compression::Zstd);
        assert!(config.properties(None).is_ok());
    }
}
