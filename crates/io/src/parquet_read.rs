//! Low-level Parquet reading and long-layout reconstruction.

use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{AsArray, RecordBatch};
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::NaiveDate;
use ndarray::{Array2, Array3};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use crate::error::IoError;
use crate::grid::GriddedSeries;
use crate::parquet_write::{LAT, LON, REGION, TIME, UNIX_EPOCH_FROM_CE};

/// Batches plus file-level key/value metadata.
pub(crate) struct ParquetContents {
    /// Record batches in file order.
    pub batches: Vec<RecordBatch>,
    /// File-level key/value metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Reads all record batches and key/value metadata from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Parquet`] if the file cannot be opened or read.
pub(crate) fn read_batches(path: &Path) -> Result<ParquetContents, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let metadata: BTreeMap<String, String> = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|kvs| {
            kvs.iter()
                .filter_map(|kv| kv.value.clone().map(|v| (kv.key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();

    let reader = builder.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(ParquetContents { batches, metadata })
}

fn missing(name: &str, source: &str) -> IoError {
    IoError::MissingVariable {
        name: name.to_string(),
        source_name: source.to_string(),
    }
}

fn wrong_type(name: &str, expected: &str) -> IoError {
    IoError::Validation {
        count: 1,
        details: format!("column '{name}' is not {expected}"),
    }
}

fn f64_column(batches: &[RecordBatch], name: &str, source: &str) -> Result<Vec<f64>, IoError> {
    let mut out = Vec::new();
    for batch in batches {
        let col = batch
            .column_by_name(name)
            .ok_or_else(|| missing(name, source))?;
        let arr = col
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| wrong_type(name, "Float64"))?;
        out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    Ok(out)
}

fn date_column(
    batches: &[RecordBatch],
    name: &str,
    source: &str,
) -> Result<Vec<NaiveDate>, IoError> {
    let mut out = Vec::new();
    for batch in batches {
        let col = batch
            .column_by_name(name)
            .ok_or_else(|| missing(name, source))?;
        let arr = col
            .as_primitive_opt::<Date32Type>()
            .ok_or_else(|| wrong_type(name, "Date32"))?;
        for v in arr.iter() {
            let days = v.ok_or_else(|| IoError::InvalidTime {
                reason: format!("null time value in {source}"),
            })?;
            let date = NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_FROM_CE)
                .ok_or_else(|| IoError::InvalidTime {
                    reason: format!("Date32 value {days} out of range"),
                })?;
            out.push(date);
        }
    }
    Ok(out)
}

fn layout_error(source: &str, details: String) -> IoError {
    IoError::Validation {
        count: 1,
        details: format!("{source}: {details}"),
    }
}

/// Recovers the `lat` and `lon` axes from the first `plane` rows and checks
/// that every row repeats that plane in C order.
fn infer_plane(
    lat: &[f64],
    lon: &[f64],
    plane: usize,
    source: &str,
) -> Result<(Vec<f64>, Vec<f64>), IoError> {
    let nx = lat[..plane].iter().take_while(|&&y| y == lat[0]).count();
    if nx == 0 || plane % nx != 0 {
        return Err(layout_error(
            source,
            format!("{plane} cells per timestep is not a multiple of {nx} longitudes"),
        ));
    }
    let ny = plane / nx;
    let lat_axis: Vec<f64> = (0..ny).map(|y| lat[y * nx]).collect();
    let lon_axis: Vec<f64> = lon[..nx].to_vec();

    for (i, (&y, &x)) in lat.iter().zip(lon).enumerate() {
        let cell = i % plane;
        if y != lat_axis[cell / nx] || x != lon_axis[cell % nx] {
            return Err(layout_error(
                source,
                format!("row {i} at ({y}, {x}) breaks the (lat, lon) grid order"),
            ));
        }
    }
    Ok((lat_axis, lon_axis))
}

/// Rebuilds a [`GriddedSeries`] from long-format batches.
pub(crate) fn long_to_series(
    batches: &[RecordBatch],
    source: &str,
) -> Result<GriddedSeries, IoError> {
    let time = date_column(batches, TIME, source)?;
    let lat = f64_column(batches, LAT, source)?;
    let lon = f64_column(batches, LON, source)?;

    let n = time.len();
    if n == 0 {
        return Err(layout_error(source, "file contains no rows".to_string()));
    }

    let plane = time.iter().take_while(|&&t| t == time[0]).count();
    if n % plane != 0 {
        return Err(layout_error(
            source,
            format!("{n} rows is not a multiple of {plane} cells per timestep"),
        ));
    }
    let nt = n / plane;
    let (lat_axis, lon_axis) = infer_plane(&lat, &lon, plane, source)?;
    let time_axis: Vec<NaiveDate> = (0..nt).map(|t| time[t * plane]).collect();
    for (i, t) in time.iter().enumerate() {
        if *t != time_axis[i / plane] {
            return Err(layout_error(
                source,
                format!("row {i} has time {t}, expected {}", time_axis[i / plane]),
            ));
        }
    }

    let shape = (nt, lat_axis.len(), lon_axis.len());
    let mut series = GriddedSeries::new(time_axis, lat_axis, lon_axis)?;

    let schema = batches[0].schema();
    for field in schema.fields() {
        let name = field.name();
        if name == TIME || name == LAT || name == LON {
            continue;
        }
        if field.data_type() != &DataType::Float64 {
            debug!(column = %name, source, "skipping non-Float64 column");
            continue;
        }
        let values = f64_column(batches, name, source)?;
        let data = Array3::from_shape_vec(shape, values).map_err(|e| {
            layout_error(source, format!("column '{name}' does not fill the grid: {e}"))
        })?;
        series.insert_variable(name.clone(), data)?;
    }

    Ok(series)
}

/// Rebuilds `(lat, lon, regions)` from long-format mask batches.
pub(crate) fn long_to_regions(
    batches: &[RecordBatch],
    source: &str,
) -> Result<(Vec<f64>, Vec<f64>, Array2<Option<i64>>), IoError> {
    let lat = f64_column(batches, LAT, source)?;
    let lon = f64_column(batches, LON, source)?;

    let mut regions = Vec::with_capacity(lat.len());
    for batch in batches {
        let col = batch
            .column_by_name(REGION)
            .ok_or_else(|| missing(REGION, source))?;
        let arr = col
            .as_primitive_opt::<Int64Type>()
            .ok_or_else(|| wrong_type(REGION, "Int64"))?;
        regions.extend(arr.iter());
    }

    if lat.is_empty() {
        return Err(layout_error(source, "file contains no rows".to_string()));
    }

    let (lat_axis, lon_axis) = infer_plane(&lat, &lon, lat.len(), source)?;
    let grid = Array2::from_shape_vec((lat_axis.len(), lon_axis.len()), regions)
        .map_err(|e| layout_error(source, format!("region column does not fill the grid: {e}")))?;
    Ok((lat_axis, lon_axis, grid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Date32Array, Float64Array};
    use arrow::datatypes::{Field, Schema};

    use super::*;

    fn batch(time: Vec<i32>, lat: Vec<f64>, lon: Vec<f64>, v: Vec<f64>) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("time", DataType::Date32, false),
            Field::new("lat", DataType::Float64, false),
            Field::new("lon", DataType::Float64, false),
            Field::new("v", DataType::Float64, true),
        ]);
        let cols: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from(time)),
            Arc::new(Float64Array::from(lat)),
            Arc::new(Float64Array::from(lon)),
            Arc::new(Float64Array::from(v)),
        ];
        RecordBatch::try_new(Arc::new(schema), cols).unwrap()
    }

    #[test]
    fn reconstructs_axes() {
        let b = batch(
            vec![0, 0, 0, 0, 31, 31, 31, 31],
            vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0],
            vec![5.0, 6.0, 5.0, 6.0, 5.0, 6.0, 5.0, 6.0],
            (0..8).map(|i| i as f64).collect(),
        );
        let s = long_to_series(&[b], "test").unwrap();
        assert_eq!(s.shape(), [2, 2, 2]);
        assert_eq!(s.lat(), &[1.0, 2.0]);
        assert_eq!(s.lon(), &[5.0, 6.0]);
        assert_eq!(s.time()[1], NaiveDate::from_ymd_opt(1970, 2, 1).unwrap());
        assert_eq!(s.require("v").unwrap()[[1, 0, 1]], 5.0);
    }

    #[test]
    fn rejects_shuffled_rows() {
        let b = batch(
            vec![0, 0, 0, 0],
            vec![1.0, 1.0, 2.0, 2.0],
            vec![5.0, 6.0, 6.0, 5.0],
            vec![0.0; 4],
        );
        let err = long_to_series(&[b], "test").unwrap_err();
        assert!(err.to_string().contains("breaks the (lat, lon) grid order"));
    }

    #[test]
    fn rejects_ragged_timesteps() {
        let b = batch(
            vec![0, 0, 1],
            vec![1.0, 1.0, 1.0],
            vec![5.0, 6.0, 5.0],
            vec![0.0; 3],
        );
        assert!(long_to_series(&[b], "test").is_err());
    }

    #[test]
    fn missing_time_column() {
        let schema = Schema::new(vec![Field::new("lat", DataType::Float64, false)]);
        let b = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Float64Array::from(vec![1.0])) as ArrayRef],
        )
        .unwrap();
        assert!(matches!(
            long_to_series(&[b], "test").unwrap_err(),
            IoError::MissingVariable { .. }
        ));
    }

    #[test]
    fn read_batches_file_not_found() {
        let result = read_batches(Path::new("/nonexistent/path/file.parquet"));
        match result {
            Err(IoError::FileNotFound { path }) => {
                assert_eq!(path.to_str().unwrap(), "/nonexistent/path/file.parquet");
            }
            _ => panic!("expected FileNotFound error"),
        }
    }
}
