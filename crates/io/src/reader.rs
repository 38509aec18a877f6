//! High-level readers for grids, series and region masks.

use std::path::Path;

use tracing::debug;

use crate::error::IoError;
use crate::grid::{Grid, GriddedSeries};
use crate::mask::{RegionLookup, RegionMask, label_from_path};
use crate::parquet_read;
use crate::parquet_write::{KEYS_METADATA, VALUES_METADATA};

/// Reads a long-layout Parquet file into a [`GriddedSeries`].
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file, [`IoError::Parquet`]
/// for unreadable content and [`IoError::Validation`] if the rows do not form
/// a regular `(time, lat, lon)` grid.
pub fn read_series(path: &Path) -> Result<GriddedSeries, IoError> {
    let contents = parquet_read::read_batches(path)?;
    let source = path.display().to_string();
    let series = parquet_read::long_to_series(&contents.batches, &source)?;
    debug!(
        path = %source,
        shape = ?series.shape(),
        variables = ?series.variable_names(),
        "read gridded series"
    );
    Ok(series)
}

/// Reads a single-timestep file as a [`Grid`].
///
/// With `variable = None` the file must hold exactly one data variable.
///
/// # Errors
///
/// Returns [`IoError::DimensionMismatch`] if the file holds more than one
/// timestep, [`IoError::MissingVariable`] if the variable is absent and
/// [`IoError::Validation`] if the variable is ambiguous.
pub fn read_grid(path: &Path, variable: Option<&str>) -> Result<Grid, IoError> {
    let series = read_series(path)?;
    if series.n_time() != 1 {
        return Err(IoError::DimensionMismatch {
            name: "time".to_string(),
            expected: 1,
            got: series.n_time(),
        });
    }
    let name = match variable {
        Some(name) => name.to_string(),
        None => {
            let names = series.variable_names();
            match names.as_slice() {
                [only] => (*only).to_string(),
                _ => {
                    return Err(IoError::Validation {
                        count: 1,
                        details: format!(
                            "{} holds variables {names:?}; expected exactly one",
                            path.display()
                        ),
                    });
                }
            }
        }
    };
    series.grid(&name, 0).map_err(|e| match e {
        IoError::MissingVariable { name, .. } => IoError::MissingVariable {
            name,
            source_name: path.display().to_string(),
        },
        other => other,
    })
}

/// Reads a region mask and its lookup. The label is the file stem.
///
/// # Errors
///
/// Returns [`IoError::RegionSchema`] if the `keys`/`values` metadata is
/// missing or malformed.
pub fn read_region_mask(path: &Path) -> Result<RegionMask, IoError> {
    let contents = parquet_read::read_batches(path)?;
    let label = label_from_path(path);
    let source = path.display().to_string();

    let attr = |key: &str| {
        contents
            .metadata
            .get(key)
            .ok_or_else(|| IoError::RegionSchema {
                label: label.clone(),
                reason: format!("missing '{key}' metadata"),
            })
    };
    let lookup = RegionLookup::parse(&label, attr(KEYS_METADATA)?, attr(VALUES_METADATA)?)?;

    let (lat, lon, regions) = parquet_read::long_to_regions(&contents.batches, &source)?;
    debug!(label = %label, n_regions = lookup.len(), "read region mask");
    RegionMask::new(label, lat, lon, regions, lookup)
}

/// Variable and coordinate names for NetCDF ingestion.
#[cfg(feature = "netcdf")]
#[derive(Debug, Clone)]
pub struct NetcdfConfig {
    variables: Vec<String>,
    lon_aliases: Vec<String>,
    lat_aliases: Vec<String>,
    time_var: String,
}

#[cfg(feature = "netcdf")]
impl Default for NetcdfConfig {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            lon_aliases: vec!["lon".into(), "longitude".into(), "x".into()],
            lat_aliases: vec!["lat".into(), "latitude".into(), "y".into()],
            time_var: "time".into(),
        }
    }
}

#[cfg(feature = "netcdf")]
impl NetcdfConfig {
    /// Sets the data variables to read.
    pub fn with_variables(mut self, names: Vec<String>) -> Self {
        self.variables = names;
        self
    }

    /// Set the time variable name.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    fn validate(&self) -> Result<(), IoError> {
        if self.variables.is_empty() {
            return Err(IoError::Validation {
                count: 1,
                details: "at least one variable must be requested".to_string(),
            });
        }
        Ok(())
    }
}

/// Reads `time x lat x lon` variables from a NetCDF file.
///
/// # Errors
///
/// Returns [`IoError`] on missing variables, shape mismatches or
/// unsupported time units.
#[cfg(feature = "netcdf")]
pub fn read_netcdf(path: &Path, config: &NetcdfConfig) -> Result<GriddedSeries, IoError> {
    use crate::netcdf_read;

    config.validate()?;
    let file = netcdf_read::open_file(path)?;

    let lon_refs: Vec<&str> = config.lon_aliases.iter().map(String::as_str).collect();
    let lat_refs: Vec<&str> = config.lat_aliases.iter().map(String::as_str).collect();
    let lon = netcdf_read::read_1d_f64(&file, &lon_refs, path)?;
    let lat = netcdf_read::read_1d_f64(&file, &lat_refs, path)?;

    let offsets = netcdf_read::read_1d_f64(&file, &[&config.time_var], path)?;
    let base = netcdf_read::read_time_base(&file, &config.time_var)?;
    let time = netcdf_read::offsets_to_dates(base, &offsets)?;

    let shape = (time.len(), lat.len(), lon.len());
    let mut series = GriddedSeries::new(time, lat, lon)?;
    for name in &config.variables {
        let (data, _) = netcdf_read::read_3d_f64(&file, name, path)?;
        let array = ndarray::Array3::from_shape_vec(shape, data).map_err(|e| {
            IoError::Validation {
                count: 1,
                details: format!("variable '{name}' does not match (time, lat, lon): {e}"),
            }
        })?;
        series.insert_variable(name.clone(), array)?;
    }
    debug!(path = %path.display(), shape = ?series.shape(), "read netcdf");
    Ok(series)
}
