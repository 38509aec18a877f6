//! Integration tests: grids and region masks through Parquet files.

use chrono::NaiveDate;
use drought_io::{
    Compression, GriddedSeries, IoError, RegionLookup, RegionMask, WriterConfig, read_grid,
    read_region_mask, read_series, write_grid, write_region_mask, write_series,
};
use ndarray::{Array2, Array3};

fn month_ends(n: usize) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| {
            let first = NaiveDate::from_ymd_opt(2018, i as u32 + 2, 1).unwrap();
            first.pred_opt().unwrap()
        })
        .collect()
}

fn series(n: usize) -> GriddedSeries {
    let lat = vec![-2.0, -1.0, 0.0];
    let lon = vec![30.0, 31.0];
    let vhi = Array3::from_shape_fn((n, 3, 2), |(t, y, x)| (t * 10 + y * 2 + x) as f64);
    let mut precip = Array3::from_shape_fn((n, 3, 2), |(t, _, _)| t as f64 + 0.5);
    precip[[0, 1, 1]] = f64::NAN;
    GriddedSeries::new(month_ends(n), lat, lon)
        .unwrap()
        .with_variable("VHI", vhi)
        .unwrap()
        .with_variable("precip", precip)
        .unwrap()
}

#[test]
fn series_survives_parquet() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("x.parquet");
    let original = series(4);

    write_series(&path, &original, &WriterConfig::default()).expect("write succeeds");
    let back = read_series(&path).expect("read succeeds");

    assert_eq!(back.time(), original.time());
    assert_eq!(back.lat(), original.lat());
    assert_eq!(back.lon(), original.lon());
    assert_eq!(back.variable_names(), vec!["VHI", "precip"]);
    assert_eq!(back.variable("VHI"), original.variable("VHI"));
    let p = back.variable("precip").unwrap();
    assert!(p[[0, 1, 1]].is_nan());
    assert_eq!(p[[3, 2, 1]], 3.5);
}

#[test]
fn rewriting_replaces_contents() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("x.parquet");
    let config = WriterConfig::default().with_compression(Compression::Zstd);

    write_series(&path, &series(4), &config).unwrap();
    write_series(&path, &series(2), &config).unwrap();

    assert_eq!(read_series(&path).unwrap().n_time(), 2);
}

#[test]
fn grid_needs_single_timestep() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("x.parquet");
    write_series(&path, &series(2), &WriterConfig::default()).unwrap();

    match read_grid(&path, Some("VHI")).unwrap_err() {
        IoError::DimensionMismatch { expected, got, .. } => {
            assert_eq!(expected, 1);
            assert_eq!(got, 2);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn grid_variable_inferred_when_unique() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("preds_2018_1.parquet");
    let grid = series(1).grid("VHI", 0).unwrap();
    write_grid(&path, &grid, "preds", &WriterConfig::default()).unwrap();

    let back = read_grid(&path, None).unwrap();
    assert_eq!(back, grid);
    assert!(matches!(
        read_grid(&path, Some("VHI")).unwrap_err(),
        IoError::MissingVariable { .. }
    ));
}

#[test]
fn ambiguous_grid_variable_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("y.parquet");
    let one = series(1);
    write_series(&path, &one, &WriterConfig::default()).unwrap();
    assert!(matches!(
        read_grid(&path, None).unwrap_err(),
        IoError::Validation { .. }
    ));
}

#[test]
fn region_mask_keeps_lookup_and_label() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("province_l1_kenya.parquet");

    let lookup = RegionLookup::parse("province_l1_kenya", "0, 1, 2", "region_0, region_1, region_2")
        .unwrap();
    let regions = Array2::from_shape_fn((3, 2), |(y, x)| {
        if y == 2 && x == 1 { None } else { Some(((y + x) % 3) as i64) }
    });
    let mask = RegionMask::new(
        "province_l1_kenya",
        vec![-2.0, -1.0, 0.0],
        vec![30.0, 31.0],
        regions,
        lookup,
    )
    .unwrap();

    write_region_mask(&path, &mask, &WriterConfig::default()).unwrap();
    let back = read_region_mask(&path).unwrap();

    assert_eq!(back, mask);
    assert_eq!(back.label(), "province_l1_kenya");
    let names: Vec<&str> = back.lookup().iter().map(|(_, n)| n).collect();
    assert_eq!(names, vec!["region_0", "region_1", "region_2"]);
}

#[test]
fn mask_without_metadata_is_schema_violation() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("not_a_mask.parquet");
    write_series(&path, &series(1), &WriterConfig::default()).unwrap();

    match read_region_mask(&path).unwrap_err() {
        IoError::RegionSchema { label, reason } => {
            assert_eq!(label, "not_a_mask");
            assert!(reason.contains("keys"));
        }
        other => panic!("expected RegionSchema, got {other:?}"),
    }
}

#[test]
fn missing_file() {
    let err = read_series(std::path::Path::new("/nonexistent/x.parquet")).unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));
}
