//! Low-level NetCDF extraction helpers.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::IoError;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Read a 1-D `f64` variable, trying each alias in order.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    for &alias in aliases {
        if let Some(var) = file.variable(alias) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }

    let name = aliases.first().copied().unwrap_or("unknown");
    Err(IoError::MissingVariable {
        name: name.to_string(),
        source_name: path.display().to_string(),
    })
}

/// Read a `time x lat x lon` variable as flat C-order data plus its shape.
pub(crate) fn read_3d_f64(
    file: &netcdf::File,
    var_name: &str,
    path: &Path,
) -> Result<(Vec<f64>, [usize; 3]), IoError> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| IoError::MissingVariable {
            name: var_name.to_string(),
            source_name: path.display().to_string(),
        })?;

    let dims = var.dimensions();
    if dims.len() != 3 {
        return Err(IoError::DimensionMismatch {
            name: format!("{var_name} dimensions"),
            expected: 3,
            got: dims.len(),
        });
    }
    let shape = [dims[0].len(), dims[1].len(), dims[2].len()];

    let data = var.get_values::<f64, _>(..)?;
    Ok((data, shape))
}

/// Base date from a CF `units` attribute such as `"days since 1970-01-01"`.
pub(crate) fn read_time_base(
    file: &netcdf::File,
    time_var: &str,
) -> Result<NaiveDate, IoError> {
    let var = file
        .variable(time_var)
        .ok_or_else(|| IoError::InvalidTime {
            reason: format!("no time variable '{time_var}'"),
        })?;

    let units: String = var
        .attribute_value("units")
        .ok_or_else(|| IoError::InvalidTime {
            reason: format!("time variable '{time_var}' has no 'units' attribute"),
        })?
        .map_err(|e| IoError::InvalidTime {
            reason: format!("failed to read 'units' attribute: {e}"),
        })?
        .try_into()
        .map_err(|e: netcdf::Error| IoError::InvalidTime {
            reason: format!("'units' attribute is not a string: {e}"),
        })?;

    parse_days_since(&units)
}

/// Parses `"days since YYYY-MM-DD[ HH:MM:SS]"`.
pub(crate) fn parse_days_since(units: &str) -> Result<NaiveDate, IoError> {
    let parts: Vec<&str> = units.splitn(3, ' ').collect();
    if parts.len() < 3 || parts[0] != "days" || parts[1] != "since" {
        return Err(IoError::InvalidTime {
            reason: format!("unsupported time units '{units}'"),
        });
    }
    let date_str = parts[2].get(..10).unwrap_or(parts[2]);
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| IoError::InvalidTime {
        reason: format!("failed to parse base date '{date_str}': {e}"),
    })
}

/// Converts day offsets (truncated to whole days) into dates.
pub(crate) fn offsets_to_dates(base: NaiveDate, offsets: &[f64]) -> Result<Vec<NaiveDate>, IoError> {
    offsets
        .iter()
        .map(|&offset| {
            let days = offset as i64;
            base.checked_add_signed(chrono::TimeDelta::days(days))
                .ok_or_else(|| IoError::InvalidTime {
                    reason: format!("date overflow adding {days} days to {base}"),
                })
        })
        .collect()
}
