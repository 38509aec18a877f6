//! In-memory gridded containers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use drought_calendar::YearMonth;
use ndarray::{Array2, Array3, Axis};

use crate::error::IoError;

/// Absolute tolerance when matching coordinate values between grids.
pub const COORD_TOLERANCE: f64 = 1e-6;

/// Multi-variable gridded time series indexed `(time, lat, lon)`.
///
/// Construction guarantees a strictly increasing time axis and that every
/// variable array has shape `(time.len(), lat.len(), lon.len())`.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedSeries {
    time: Vec<NaiveDate>,
    lat: Vec<f64>,
    lon: Vec<f64>,
    variables: BTreeMap<String, Array3<f64>>,
}

impl GriddedSeries {
    /// Creates an empty series (no variables) over the given axes.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `time` is not strictly increasing.
    pub fn new(time: Vec<NaiveDate>, lat: Vec<f64>, lon: Vec<f64>) -> Result<Self, IoError> {
        if let Some(w) = time.windows(2).find(|w| w[0] >= w[1]) {
            return Err(IoError::Validation {
                count: 1,
                details: format!("time axis not strictly increasing at {} -> {}", w[0], w[1]),
            });
        }
        Ok(Self {
            time,
            lat,
            lon,
            variables: BTreeMap::new(),
        })
    }

    /// Adds (or replaces) a variable.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if `data` does not match the axes.
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        data: Array3<f64>,
    ) -> Result<Self, IoError> {
        self.insert_variable(name, data)?;
        Ok(self)
    }

    /// In-place form of [`with_variable`](Self::with_variable).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if `data` does not match the axes.
    pub fn insert_variable(
        &mut self,
        name: impl Into<String>,
        data: Array3<f64>,
    ) -> Result<(), IoError> {
        let expected = self.shape();
        for (axis, (&want, &got)) in ["time", "lat", "lon"]
            .iter()
            .zip(expected.iter().zip(data.shape()))
        {
            if want != got {
                return Err(IoError::DimensionMismatch {
                    name: (*axis).to_string(),
                    expected: want,
                    got,
                });
            }
        }
        self.variables.insert(name.into(), data);
        Ok(())
    }

    /// Returns the time axis.
    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    /// Returns the latitude axis.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Returns the longitude axis.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// `[time, lat, lon]` sizes.
    pub fn shape(&self) -> [usize; 3] {
        [self.time.len(), self.lat.len(), self.lon.len()]
    }

    /// Number of timesteps.
    pub fn n_time(&self) -> usize {
        self.time.len()
    }

    /// Whether the series has no timesteps.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Earliest timestamp.
    pub fn min_time(&self) -> Option<NaiveDate> {
        self.time.first().copied()
    }

    /// Latest timestamp.
    pub fn max_time(&self) -> Option<NaiveDate> {
        self.time.last().copied()
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Array3<f64>> {
        self.variables.get(name)
    }

    /// Looks up a variable, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingVariable`].
    pub fn require(&self, name: &str) -> Result<&Array3<f64>, IoError> {
        self.variables
            .get(name)
            .ok_or_else(|| IoError::MissingVariable {
                name: name.to_string(),
                source_name: format!("series with variables {:?}", self.variable_names()),
            })
    }

    /// Variable names in sorted order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// Iterates `(name, array)` pairs in sorted name order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Array3<f64>)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keeps the given timestep indices (which must be increasing).
    pub fn select_indices(&self, indices: &[usize]) -> Self {
        Self {
            time: indices.iter().map(|&i| self.time[i]).collect(),
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            variables: self
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.select(Axis(0), indices)))
                .collect(),
        }
    }

    /// Keeps the timesteps whose date satisfies `keep`.
    pub fn select_time(&self, keep: impl Fn(NaiveDate) -> bool) -> Self {
        let indices: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter(|(_, d)| keep(**d))
            .map(|(i, _)| i)
            .collect();
        self.select_indices(&indices)
    }

    /// Timesteps in the half-open interval `(after, until]`.
    pub fn select_range(&self, after: NaiveDate, until: NaiveDate) -> Self {
        self.select_time(|d| d > after && d <= until)
    }

    /// Timesteps falling in `month`.
    pub fn select_month(&self, month: YearMonth) -> Self {
        self.select_time(|d| month.contains(d))
    }

    /// Keeps only the named variables.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingVariable`] if any name is absent.
    pub fn select_variables(&self, names: &[&str]) -> Result<Self, IoError> {
        let mut variables = BTreeMap::new();
        for name in names {
            variables.insert((*name).to_string(), self.require(name)?.clone());
        }
        Ok(Self {
            time: self.time.clone(),
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            variables,
        })
    }

    /// Extracts a single timestep of one variable as a [`Grid`].
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingVariable`] if the variable is absent and
    /// [`IoError::DimensionMismatch`] if `t` is out of range.
    pub fn grid(&self, variable: &str, t: usize) -> Result<Grid, IoError> {
        let data = self.require(variable)?;
        if t >= self.time.len() {
            return Err(IoError::DimensionMismatch {
                name: "time".to_string(),
                expected: t + 1,
                got: self.time.len(),
            });
        }
        Grid::new(
            self.time[t],
            self.lat.clone(),
            self.lon.clone(),
            data.index_axis(Axis(0), t).to_owned(),
        )
    }
}

/// A single-timestep 2-D field `(lat, lon)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    time: NaiveDate,
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Array2<f64>,
}

impl Grid {
    /// Creates a grid.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if `values` is not `(lat, lon)` shaped.
    pub fn new(
        time: NaiveDate,
        lat: Vec<f64>,
        lon: Vec<f64>,
        values: Array2<f64>,
    ) -> Result<Self, IoError> {
        check_2d(values.dim(), lat.len(), lon.len())?;
        Ok(Self {
            time,
            lat,
            lon,
            values,
        })
    }

    /// Timestamp of the field.
    pub fn time(&self) -> NaiveDate {
        self.time
    }

    /// Returns the latitude axis.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Returns the longitude axis.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Returns the `(lat, lon)` values.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Whether both grids share the same coordinate axes.
    pub fn same_coords(&self, other: &Grid) -> bool {
        coords_equal(&self.lat, &other.lat) && coords_equal(&self.lon, &other.lon)
    }

    /// Subsets this grid to the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CoordinateMismatch`] naming `context` if any
    /// requested coordinate is absent.
    pub fn restrict_to(&self, lat: &[f64], lon: &[f64], context: &str) -> Result<Grid, IoError> {
        let yi = coordinate_indices("lat", &self.lat, lat, context)?;
        let xi = coordinate_indices("lon", &self.lon, lon, context)?;
        let values = self.values.select(Axis(0), &yi).select(Axis(1), &xi);
        Grid::new(self.time, lat.to_vec(), lon.to_vec(), values)
    }

    /// Wraps the field as a one-step series holding `variable`.
    pub fn into_series(self, variable: &str) -> Result<GriddedSeries, IoError> {
        let data = self.values.insert_axis(Axis(0));
        GriddedSeries::new(vec![self.time], self.lat, self.lon)?.with_variable(variable, data)
    }
}

pub(crate) fn check_2d(dim: (usize, usize), ny: usize, nx: usize) -> Result<(), IoError> {
    if dim.0 != ny {
        return Err(IoError::DimensionMismatch {
            name: "lat".to_string(),
            expected: ny,
            got: dim.0,
        });
    }
    if dim.1 != nx {
        return Err(IoError::DimensionMismatch {
            name: "lon".to_string(),
            expected: nx,
            got: dim.1,
        });
    }
    Ok(())
}

fn coords_equal(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= COORD_TOLERANCE)
}

/// Position in `have` of every value in `want`.
pub(crate) fn coordinate_indices(
    axis: &str,
    have: &[f64],
    want: &[f64],
    context: &str,
) -> Result<Vec<usize>, IoError> {
    want.iter()
        .map(|w| {
            have.iter()
                .position(|h| (h - w).abs() <= COORD_TOLERANCE)
                .ok_or_else(|| IoError::CoordinateMismatch {
                    axis: axis.to_string(),
                    value: w.to_string(),
                    context: context.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly(n: usize) -> GriddedSeries {
        let time: Vec<NaiveDate> = (0..n)
            .map(|i| {
                YearMonth::new(2000 + (i / 12) as i32, (i % 12) as u8 + 1)
                    .unwrap()
                    .last_day()
            })
            .collect();
        let data = Array3::from_shape_fn((n, 2, 3), |(t, y, x)| (t * 100 + y * 10 + x) as f64);
        GriddedSeries::new(time, vec![0.0, 1.0], vec![10.0, 11.0, 12.0])
            .unwrap()
            .with_variable("VHI", data)
            .unwrap()
    }

    #[test]
    fn rejects_unsorted_time() {
        let err = GriddedSeries::new(vec![d(2000, 2, 1), d(2000, 1, 1)], vec![], vec![]).unwrap_err();
        assert!(matches!(err, IoError::Validation { .. }));
    }

    #[test]
    fn rejects_duplicate_time() {
        assert!(GriddedSeries::new(vec![d(2000, 1, 1), d(2000, 1, 1)], vec![], vec![]).is_err());
    }

    #[test]
    fn rejects_wrong_shape() {
        let s = GriddedSeries::new(vec![d(2000, 1, 31)], vec![0.0], vec![0.0, 1.0]).unwrap();
        let err = s.with_variable("a", Array3::zeros((1, 1, 3))).unwrap_err();
        match err {
            IoError::DimensionMismatch { name, expected, got } => {
                assert_eq!(name, "lon");
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn select_range_is_half_open() {
        let s = monthly(6);
        let sub = s.select_range(d(2000, 1, 31), d(2000, 4, 30));
        assert_eq!(sub.time(), &[d(2000, 2, 29), d(2000, 3, 31), d(2000, 4, 30)]);
        assert_eq!(sub.require("VHI").unwrap()[[0, 0, 0]], 100.0);
    }

    #[test]
    fn select_month_picks_one_step() {
        let s = monthly(6);
        let sub = s.select_month(YearMonth::new(2000, 3).unwrap());
        assert_eq!(sub.n_time(), 1);
        assert_eq!(sub.require("VHI").unwrap()[[0, 1, 2]], 212.0);
    }

    #[test]
    fn select_variables_missing() {
        let s = monthly(2);
        assert!(matches!(
            s.select_variables(&["precip"]).unwrap_err(),
            IoError::MissingVariable { .. }
        ));
    }

    #[test]
    fn grid_extraction_and_restriction() {
        let s = monthly(3);
        let g = s.grid("VHI", 2).unwrap();
        assert_eq!(g.time(), d(2000, 3, 31));
        let r = g.restrict_to(&[1.0], &[12.0, 10.0], "test").unwrap();
        assert_eq!(r.values()[[0, 0]], 212.0);
        assert_eq!(r.values()[[0, 1]], 210.0);
    }

    #[test]
    fn restriction_to_absent_coordinate_fails() {
        let g = monthly(1).grid("VHI", 0).unwrap();
        let err = g.restrict_to(&[0.0], &[99.0], "truth grid").unwrap_err();
        assert!(matches!(err, IoError::CoordinateMismatch { .. }));
        assert!(err.to_string().contains("truth grid"));
    }

    #[test]
    fn grid_into_series() {
        let g = monthly(2).grid("VHI", 1).unwrap();
        let s = g.clone().into_series("preds").unwrap();
        assert_eq!(s.shape(), [1, 2, 3]);
        assert_eq!(s.grid("preds", 0).unwrap(), g);
    }
}
