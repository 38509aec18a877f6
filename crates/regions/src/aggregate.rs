//! Per-region means of predicted and true fields.

use std::path::Path;

use chrono::NaiveDate;
use drought_io::{COORD_TOLERANCE, Grid, RegionMask};
use drought_metrics::MetricKind;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{RegionError, output_error};

/// Parallel columns of a tidy `(datetime, region)` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeanStatistics {
    /// Target date of each row.
    pub datetimes: Vec<NaiveDate>,
    /// Region name of each row.
    pub region_names: Vec<String>,
    /// Mean prediction over the region.
    pub predicted_mean_values: Vec<f64>,
    /// Mean ground truth over the region.
    pub true_mean_values: Vec<f64>,
}

/// One row of a [`MeanStatistics`] table as written to CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    /// Target date.
    pub datetime: NaiveDate,
    /// Region name from the mask lookup.
    pub region_name: String,
    /// Mean prediction over the region.
    pub predicted_mean_value: f64,
    /// Mean ground truth over the region.
    pub true_mean_value: f64,
}

impl MeanStatistics {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.datetimes.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.datetimes.is_empty()
    }

    /// Appends one row.
    pub fn push(&mut self, row: RegionRow) {
        self.datetimes.push(row.datetime);
        self.region_names.push(row.region_name);
        self.predicted_mean_values.push(row.predicted_mean_value);
        self.true_mean_values.push(row.true_mean_value);
    }

    /// Appends every row of `other`.
    pub fn extend(&mut self, other: MeanStatistics) {
        self.datetimes.extend(other.datetimes);
        self.region_names.extend(other.region_names);
        self.predicted_mean_values.extend(other.predicted_mean_values);
        self.true_mean_values.extend(other.true_mean_values);
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = RegionRow> + '_ {
        (0..self.len()).map(|i| RegionRow {
            datetime: self.datetimes[i],
            region_name: self.region_names[i].clone(),
            predicted_mean_value: self.predicted_mean_values[i],
            true_mean_value: self.true_mean_values[i],
        })
    }

    /// Writes `datetime,region_name,predicted_mean_value,true_mean_value`,
    /// replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<(), RegionError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| output_error(path, e))?;
        for row in self.rows() {
            writer.serialize(row).map_err(|e| output_error(path, e))?;
        }
        writer.flush().map_err(|e| output_error(path, e))
    }

    /// Reads a table written by [`write_csv`](Self::write_csv).
    pub fn read_csv(path: &Path) -> Result<Self, RegionError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| output_error(path, e))?;
        let mut out = MeanStatistics::default();
        for row in reader.deserialize::<RegionRow>() {
            out.push(row.map_err(|e| output_error(path, e))?);
        }
        Ok(out)
    }
}

fn same_axis(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= COORD_TOLERANCE)
}

fn check_aligned(mask: &RegionMask, grid: &Grid, what: &str) -> Result<(), RegionError> {
    if same_axis(mask.lat(), grid.lat()) && same_axis(mask.lon(), grid.lon()) {
        Ok(())
    } else {
        Err(RegionError::Misaligned {
            what: format!(
                "mask '{}' is {}x{}, {what} is {}x{}",
                mask.label(),
                mask.lat().len(),
                mask.lon().len(),
                grid.lat().len(),
                grid.lon().len()
            ),
        })
    }
}

/// Mean of the finite cells of `values` inside region `id`; `NaN` if none.
fn masked_mean(regions: &Array2<Option<i64>>, values: &Array2<f64>, id: i64) -> f64 {
    let (sum, n) = regions
        .iter()
        .zip(values.iter())
        .filter(|(r, v)| **r == Some(id) && v.is_finite())
        .fold((0.0, 0usize), |(s, n), (_, v)| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Spatial means of `pred` and `truth` inside every region of `mask`, one
/// row per region in lookup order, all stamped with `datetime`.
///
/// Cells outside a region or holding a non-finite value are excluded, for
/// predicted and true values independently.
///
/// # Errors
///
/// Returns [`RegionError::Misaligned`] if the three grids do not share
/// coordinates. Restrict them first with [`Grid::restrict_to`] and
/// [`RegionMask::restrict_to`].
pub fn compute_mean_statistics(
    mask: &RegionMask,
    pred: &Grid,
    truth: &Grid,
    datetime: NaiveDate,
) -> Result<MeanStatistics, RegionError> {
    check_aligned(mask, pred, "prediction")?;
    check_aligned(mask, truth, "ground truth")?;

    let mut out = MeanStatistics::default();
    for (id, name) in mask.lookup().iter() {
        out.push(RegionRow {
            datetime,
            region_name: name.to_string(),
            predicted_mean_value: masked_mean(mask.regions(), pred.values(), id),
            true_mean_value: masked_mean(mask.regions(), truth.values(), id),
        });
    }
    Ok(out)
}

/// Per-pixel metric map over aligned prediction / truth stacks.
///
/// Each pixel's time series is scored independently; pixels where the
/// metric is undefined are `NaN`.
pub fn spatial_metric(
    metric: MetricKind,
    preds: &[Grid],
    truths: &[Grid],
) -> Result<Array2<f64>, RegionError> {
    if preds.len() != truths.len() {
        return Err(RegionError::Misaligned {
            what: format!("{} predictions against {} truths", preds.len(), truths.len()),
        });
    }
    let Some(first) = preds.first() else {
        return Err(RegionError::Misaligned {
            what: "no timesteps to score".to_string(),
        });
    };
    for (p, t) in preds.iter().zip(truths) {
        if !first.same_coords(p) || !first.same_coords(t) || p.time() != t.time() {
            return Err(RegionError::Misaligned {
                what: format!("prediction/truth pair at {} differs from the stack", p.time()),
            });
        }
    }

    let time: Vec<NaiveDate> = preds.iter().map(Grid::time).collect();
    let (ny, nx) = first.values().dim();
    let mut out = Array2::from_elem((ny, nx), f64::NAN);
    for y in 0..ny {
        for x in 0..nx {
            let obs: Vec<f64> = truths.iter().map(|g| g.values()[[y, x]]).collect();
            let sim: Vec<f64> = preds.iter().map(|g| g.values()[[y, x]]).collect();
            out[[y, x]] = metric.score(&time, &obs, &sim);
        }
    }
    Ok(out)
}

/// Mean of a metric map inside every region of `mask`, in lookup order:
/// the mean of pixel errors rather than the error of the mean prediction.
pub fn region_metric_means(
    mask: &RegionMask,
    metric_map: &Array2<f64>,
) -> Result<Vec<(String, f64)>, RegionError> {
    if mask.regions().dim() != metric_map.dim() {
        return Err(RegionError::Misaligned {
            what: format!(
                "mask '{}' is {:?}, metric map is {:?}",
                mask.label(),
                mask.regions().dim(),
                metric_map.dim()
            ),
        });
    }
    Ok(mask
        .lookup()
        .iter()
        .map(|(id, name)| (name.to_string(), masked_mean(mask.regions(), metric_map, id)))
        .collect())
}
