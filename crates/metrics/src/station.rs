//! Per-station paired series and error tables.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use drought_calendar::Season;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::MetricError;
use crate::kind::MetricKind;

/// One row of a `station_id,time,obs,sim` predictions file.
///
/// Empty `obs` / `sim` cells read as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Station identifier.
    pub station_id: String,
    /// Timestep of the observation.
    pub time: NaiveDate,
    /// Observed value.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub obs: Option<f64>,
    /// Simulated value.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub sim: Option<f64>,
}

/// Observed and simulated values of one station in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSeries {
    time: Vec<NaiveDate>,
    obs: Vec<f64>,
    sim: Vec<f64>,
}

impl StationSeries {
    /// Timesteps in ascending order.
    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    /// Observed values, NaN where missing.
    pub fn obs(&self) -> &[f64] {
        &self.obs
    }

    /// Simulated values, NaN where missing.
    pub fn sim(&self) -> &[f64] {
        &self.sim
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series holds no timesteps.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn filter(&self, keep: impl Fn(NaiveDate) -> bool) -> Self {
        let mut out = Self::default();
        for i in 0..self.len() {
            if keep(self.time[i]) {
                out.time.push(self.time[i]);
                out.obs.push(self.obs[i]);
                out.sim.push(self.sim[i]);
            }
        }
        out
    }
}

/// Paired series keyed by station id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationData {
    stations: BTreeMap<String, StationSeries>,
}

impl StationData {
    /// Groups records by station and sorts each station by time.
    pub fn from_records(records: impl IntoIterator<Item = StationRecord>) -> Self {
        let mut grouped: BTreeMap<String, Vec<(NaiveDate, f64, f64)>> = BTreeMap::new();
        for r in records {
            grouped.entry(r.station_id).or_default().push((
                r.time,
                r.obs.unwrap_or(f64::NAN),
                r.sim.unwrap_or(f64::NAN),
            ));
        }

        let stations = grouped
            .into_iter()
            .map(|(id, mut rows)| {
                rows.sort_by_key(|row| row.0);
                let mut series = StationSeries::default();
                for (t, o, s) in rows {
                    series.time.push(t);
                    series.obs.push(o);
                    series.sim.push(s);
                }
                (id, series)
            })
            .collect();
        Self { stations }
    }

    /// Reads a `station_id,time,obs,sim` CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::Io`] if the file cannot be opened and
    /// [`MetricError::Csv`] for malformed rows.
    pub fn read_csv(path: &Path) -> Result<Self, MetricError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
        let records = reader
            .deserialize::<StationRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| csv_error(path, e))?;
        let data = Self::from_records(records);
        debug!(path = %path.display(), stations = data.len(), "read station predictions");
        Ok(data)
    }

    /// Series of one station.
    pub fn get(&self, station_id: &str) -> Option<&StationSeries> {
        self.stations.get(station_id)
    }

    /// Station ids in order.
    pub fn station_ids(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    /// `(station_id, series)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StationSeries)> {
        self.stations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether no station was read.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Keeps only the timesteps inside `season`.
    pub fn filter_season(&self, season: Season) -> Self {
        let stations = self
            .stations
            .iter()
            .map(|(id, series)| (id.clone(), series.filter(|t| Season::of(t) == season)))
            .collect();
        Self { stations }
    }
}

fn csv_error(path: &Path, e: csv::Error) -> MetricError {
    if let csv::ErrorKind::Io(io) = e.kind() {
        return MetricError::Io {
            path: path.to_path_buf(),
            reason: io.to_string(),
        };
    }
    MetricError::Csv {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// One row per station, one column per metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorTable {
    metrics: Vec<MetricKind>,
    rows: BTreeMap<String, Vec<f64>>,
}

impl ErrorTable {
    /// Column order of every row.
    pub fn metrics(&self) -> &[MetricKind] {
        &self.metrics
    }

    /// Metric value for a station; `None` if the station or column is absent.
    pub fn get(&self, station_id: &str, metric: MetricKind) -> Option<f64> {
        let col = self.metrics.iter().position(|m| *m == metric)?;
        self.rows.get(station_id).map(|row| row[col])
    }

    /// One metric for every station.
    pub fn column(&self, metric: MetricKind) -> Option<BTreeMap<String, f64>> {
        let col = self.metrics.iter().position(|m| *m == metric)?;
        Some(
            self.rows
                .iter()
                .map(|(id, row)| (id.clone(), row[col]))
                .collect(),
        )
    }

    /// Station ids in order.
    pub fn station_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no stations.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes `station_id,<metric>...`; undefined values are empty cells.
    pub fn write_csv(&self, path: &Path) -> Result<(), MetricError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
        let mut header = vec!["station_id"];
        header.extend(self.metrics.iter().map(|m| m.name()));
        writer.write_record(&header).map_err(|e| csv_error(path, e))?;

        for (id, row) in &self.rows {
            let mut record = vec![id.clone()];
            record.extend(row.iter().map(|v| format_cell(*v)));
            writer.write_record(&record).map_err(|e| csv_error(path, e))?;
        }
        writer.flush().map_err(|e| MetricError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

pub(crate) fn format_cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

/// Computes `metrics` for every station.
///
/// Stations are scored in parallel; a metric that is undefined for a station
/// is recorded as `NaN` without affecting other stations.
#[instrument(skip_all, fields(stations = data.len(), metrics = metrics.len()))]
pub fn calculate_errors(data: &StationData, metrics: &[MetricKind]) -> ErrorTable {
    let rows: BTreeMap<String, Vec<f64>> = data
        .stations
        .par_iter()
        .map(|(id, series)| {
            let values: Vec<f64> = metrics
                .iter()
                .map(|m| m.score(&series.time, &series.obs, &series.sim))
                .collect();
            (id.clone(), values)
        })
        .collect();

    let undefined = rows.values().flatten().filter(|v| v.is_nan()).count();
    info!(stations = rows.len(), undefined, "station errors computed");

    ErrorTable {
        metrics: metrics.to_vec(),
        rows,
    }
}
