//! Low-level Parquet column building for the long grid layout.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::IoError;
use crate::grid::GriddedSeries;
use crate::mask::RegionMask;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the Arrow `Date32` epoch.
pub(crate) const UNIX_EPOCH_FROM_CE: i32 = 719_163;

pub(crate) const TIME: &str = "time";
pub(crate) const LAT: &str = "lat";
pub(crate) const LON: &str = "lon";
pub(crate) const REGION: &str = "region";

/// Metadata key holding the comma-separated region ids.
pub const KEYS_METADATA: &str = "keys";
/// Metadata key holding the comma-separated region names.
pub const VALUES_METADATA: &str = "values";

pub(crate) fn to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

/// Schema: `time`, `lat`, `lon`, then one nullable `Float64` column per variable.
pub(crate) fn build_series_schema(series: &GriddedSeries) -> Schema {
    let mut fields = vec![
        Field::new(TIME, DataType::Date32, false),
        Field::new(LAT, DataType::Float64, false),
        Field::new(LON, DataType::Float64, false),
    ];
    for name in series.variable_names() {
        fields.push(Field::new(name, DataType::Float64, true));
    }
    Schema::new(fields)
}

/// Flattens a series into one row per `(time, lat, lon)` cell in C order.
pub(crate) fn series_to_record_batch(
    series: &GriddedSeries,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let [nt, ny, nx] = series.shape();
    let n = nt * ny * nx;

    let mut time = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut lon = Vec::with_capacity(n);
    for &t in series.time() {
        let days = to_date32(t);
        for &y in series.lat() {
            for &x in series.lon() {
                time.push(days);
                lat.push(y);
                lon.push(x);
            }
        }
    }

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(time)),
        Arc::new(Float64Array::from(lat)),
        Arc::new(Float64Array::from(lon)),
    ];
    for (_, data) in series.variables() {
        // Iteration over a standard-layout array is C order.
        let values: Vec<Option<f64>> = data
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Schema: `lat`, `lon`, nullable `region`.
pub(crate) fn build_mask_schema() -> Schema {
    Schema::new(vec![
        Field::new(LAT, DataType::Float64, false),
        Field::new(LON, DataType::Float64, false),
        Field::new(REGION, DataType::Int64, true),
    ])
}

pub(crate) fn mask_to_record_batch(
    mask: &RegionMask,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let mut lat = Vec::new();
    let mut lon = Vec::new();
    for &y in mask.lat() {
        for &x in mask.lon() {
            lat.push(y);
            lon.push(x);
        }
    }
    let region: Vec<Option<i64>> = mask.regions().iter().copied().collect();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(lat)),
        Arc::new(Float64Array::from(lon)),
        Arc::new(Int64Array::from(region)),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`,
/// truncating any existing file.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be created and
/// [`IoError::Parquet`] if batch writing or file finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Date32Type, Float64Type};
    use ndarray::Array3;

    fn series() -> GriddedSeries {
        let time = vec![
            NaiveDate::from_ymd_opt(1970, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 3).unwrap(),
        ];
        let data = Array3::from_shape_fn((2, 2, 3), |(t, y, x)| {
            if t == 1 && y == 1 && x == 2 {
                f64::NAN
            } else {
                (t * 100 + y * 10 + x) as f64
            }
        });
        GriddedSeries::new(time, vec![-1.0, 1.0], vec![30.0, 31.0, 32.0])
            .unwrap()
            .with_variable("VHI", data)
            .unwrap()
    }

    #[test]
    fn epoch_is_zero() {
        assert_eq!(to_date32(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
    }

    #[test]
    fn series_schema_columns() {
        let schema = build_series_schema(&series());
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["time", "lat", "lon", "VHI"]);
    }

    #[test]
    fn series_rows_are_c_ordered() {
        let s = series();
        let schema = build_series_schema(&s);
        let batch = series_to_record_batch(&s, &schema).unwrap();
        assert_eq!(batch.num_rows(), 12);

        let time = batch.column(0).as_primitive::<Date32Type>();
        let lon = batch.column(2).as_primitive::<Float64Type>();
        let vhi = batch.column(3).as_primitive::<Float64Type>();
        assert_eq!(time.value(0), 1);
        assert_eq!(time.value(6), 2);
        assert_eq!(lon.value(4), 31.0);
        assert_eq!(vhi.value(5), 12.0);
        assert!(vhi.is_null(11));
    }

    #[test]
    fn mask_rows() {
        use crate::mask::RegionLookup;
        use ndarray::Array2;

        let lookup = RegionLookup::parse("m", "0", "a").unwrap();
        let regions = Array2::from_shape_vec((1, 2), vec![Some(0), None]).unwrap();
        let mask = RegionMask::new("m", vec![0.0], vec![1.0, 2.0], regions, lookup).unwrap();
        let schema = build_mask_schema();
        let batch = mask_to_record_batch(&mask, &schema).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(batch.column(2).is_null(1));
    }
}
