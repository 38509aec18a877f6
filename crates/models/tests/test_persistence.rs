//! Persistence predictions over an on-disk experiment.

use std::path::Path;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use drought_calendar::YearMonth;
use drought_io::{GriddedSeries, WriterConfig, read_grid, write_series};
use drought_models::{ModelError, PREDICTION_VARIABLE, Persistence};
use drought_regions::RegionError;
use ndarray::Array3;

const EXPERIMENT: &str = "one_month_forecast";

fn month_end(year: i32, month: u8) -> NaiveDate {
    YearMonth::new(year, month).unwrap().last_day()
}

/// Writes `test/<year>_<month>` with three months of `x` and one of `y`.
fn write_example(data: &Path, target: YearMonth, level: f64, extra_y_var: bool) {
    let dir = data
        .join("features")
        .join(EXPERIMENT)
        .join("test")
        .join(format!("{}_{}", target.year(), target.month()));
    std::fs::create_dir_all(&dir).unwrap();

    let lat = vec![-1.0, 0.0, 1.0];
    let lon = vec![35.0, 36.0];
    let x_time: Vec<NaiveDate> = (1..=3)
        .rev()
        .map(|back| target.minus_months(back).unwrap().last_day())
        .collect();
    let vhi = Array3::from_shape_fn((3, 3, 2), |(t, y, x)| level + t as f64 + 0.1 * (y * 2 + x) as f64);
    let precip = Array3::from_elem((3, 3, 2), 80.0);
    let x = GriddedSeries::new(x_time, lat.clone(), lon.clone())
        .unwrap()
        .with_variable("VHI", vhi)
        .unwrap()
        .with_variable("precip", precip)
        .unwrap();
    write_series(&dir.join("x.parquet"), &x, &WriterConfig::default()).unwrap();

    let mut y = GriddedSeries::new(vec![target.last_day()], lat, lon)
        .unwrap()
        .with_variable("VHI", Array3::from_elem((1, 3, 2), level + 10.0))
        .unwrap();
    if extra_y_var {
        y.insert_variable("precip", Array3::zeros((1, 3, 2))).unwrap();
    }
    write_series(&dir.join("y.parquet"), &y, &WriterConfig::default()).unwrap();
}

#[test]
fn writes_one_prediction_per_test_example() {
    let tmp = tempfile::tempdir().unwrap();
    for (month, level) in [(1, 40.0), (2, 50.0), (3, 60.0)] {
        write_example(tmp.path(), YearMonth::new(2018, month).unwrap(), level, false);
    }

    let model = Persistence::new(tmp.path(), EXPERIMENT);
    let written = model.predict().unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(
        written[0],
        tmp.path()
            .join("models/one_month_forecast/persistence/preds_2018_1.parquet")
    );

    let feb = read_grid(&written[1], Some(PREDICTION_VARIABLE)).unwrap();
    assert_eq!(feb.time(), month_end(2018, 2));
    // last x step of February's example: level + 2
    assert_relative_eq!(feb.values()[[0, 0]], 52.0);
    assert_relative_eq!(feb.values()[[2, 1]], 52.5, epsilon = 1e-12);
}

#[test]
fn target_must_be_unambiguous() {
    let tmp = tempfile::tempdir().unwrap();
    write_example(tmp.path(), YearMonth::new(2018, 1).unwrap(), 40.0, true);

    let err = Persistence::new(tmp.path(), EXPERIMENT).predict().unwrap_err();
    assert!(matches!(err, ModelError::AmbiguousTarget { found: 2, .. }));
}

#[test]
fn no_test_examples() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Persistence::new(tmp.path(), EXPERIMENT).predict().unwrap_err();
    assert!(matches!(
        err,
        ModelError::Region(RegionError::MissingInput { stage: "ground truth", .. })
    ));
}
