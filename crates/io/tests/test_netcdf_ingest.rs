//! Integration tests for raw NetCDF ingestion (`netcdf` feature).
#![cfg(feature = "netcdf")]

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use chrono::NaiveDate;
use drought_io::{IoError, NetcdfConfig, read_netcdf};
use tempfile::tempdir;

/// Writes a monthly `time x lat x lon` file holding `VHI` and `precip`.
fn write_fixture(dir: &Path, units: &str) -> PathBuf {
    let (nt, ny, nx) = (3, 2, 4);
    let path = dir.join("kenya.nc");
    let mut file = netcdf::create(&path).expect("failed to create NetCDF file");

    file.add_dimension("time", nt).expect("add dim time");
    file.add_dimension("latitude", ny).expect("add dim lat");
    file.add_dimension("longitude", nx).expect("add dim lon");

    {
        let mut var = file
            .add_variable::<f64>("longitude", &["longitude"])
            .expect("add var lon");
        var.put_values(&[34.0, 34.5, 35.0, 35.5], ..).expect("put lon");
    }
    {
        let mut var = file
            .add_variable::<f64>("latitude", &["latitude"])
            .expect("add var lat");
        var.put_values(&[-1.0, 0.0], ..).expect("put lat");
    }
    {
        let mut var = file
            .add_variable::<f64>("time", &["time"])
            .expect("add var time");
        var.put_values(&[30.0, 58.0, 89.0], ..).expect("put time");
        var.put_attribute("units", units).expect("add time units");
    }
    for (name, offset) in [("VHI", 0.0), ("precip", 100.0)] {
        let data: Vec<f64> = (0..nt * ny * nx).map(|i| offset + i as f64).collect();
        let mut var = file
            .add_variable::<f64>(name, &["time", "latitude", "longitude"])
            .expect("add data var");
        var.put_values(&data, ..).expect("put data");
    }
    path
}

#[test]
fn reads_requested_variables_on_month_ends() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "days since 2018-01-01");
    let cfg = NetcdfConfig::default().with_variables(vec!["VHI".to_string(), "precip".to_string()]);

    let series = read_netcdf(&path, &cfg).unwrap();
    assert_eq!(series.shape(), [3, 2, 4]);
    assert_eq!(series.lat(), &[-1.0, 0.0]);
    assert_eq!(
        series.time()[1],
        NaiveDate::from_ymd_opt(2018, 2, 28).unwrap()
    );
    let vhi = series.variable("VHI").unwrap();
    assert_relative_eq!(vhi[[1, 0, 2]], 10.0);
    assert_relative_eq!(series.variable("precip").unwrap()[[2, 1, 3]], 123.0);
}

#[test]
fn missing_file_and_variable() {
    let dir = tempdir().unwrap();
    let cfg = NetcdfConfig::default().with_variables(vec!["VHI".to_string()]);
    let err = read_netcdf(&dir.path().join("absent.nc"), &cfg).unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }), "got {err:?}");

    let path = write_fixture(dir.path(), "days since 2018-01-01");
    let cfg = NetcdfConfig::default().with_variables(vec!["NDVI".to_string()]);
    let err = read_netcdf(&path, &cfg).unwrap_err();
    assert!(matches!(err, IoError::MissingVariable { .. }), "got {err:?}");
}

#[test]
fn rejects_unsupported_time_units() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "hours since 2018-01-01");
    let cfg = NetcdfConfig::default().with_variables(vec!["VHI".to_string()]);
    let err = read_netcdf(&path, &cfg).unwrap_err();
    assert!(matches!(err, IoError::InvalidTime { .. }), "got {err:?}");
}

#[test]
fn empty_variable_list_rejected() {
    let err = read_netcdf(Path::new("any.nc"), &NetcdfConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::Validation { .. }), "got {err:?}");
}
