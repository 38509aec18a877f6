//! Region analysis driver: every model's predictions against every mask.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use drought_calendar::YearMonth;
use drought_io::{Grid, RegionMask, read_grid, read_region_mask};
use drought_metrics::MetricKind;
use serde::Serialize;
use tracing::{debug, info, info_span, instrument};

use crate::aggregate::{MeanStatistics, compute_mean_statistics, region_metric_means, spatial_metric};
use crate::discover::{PredictionFile, discover_masks, discover_predictions, discover_truth};
use crate::error::{RegionError, output_error};
use crate::kind::AnalysisKind;

/// Concatenated tidy table of every model and mask.
pub const ALL_PREDICTIONS_FILE: &str = "all_models_all_regions_preds.csv";
/// RMSE / MAE / R² per model.
pub const GLOBAL_ERRORS_FILE: &str = "global_error_metrics.csv";
/// RMSE / MAE / R² per model, mask and region.
pub const REGIONAL_ERRORS_FILE: &str = "regional_error_metrics.csv";
/// Regional means of per-pixel metric maps.
pub const METRIC_MEANS_FILE: &str = "region_metric_means.csv";

const SUMMARY_METRICS: [MetricKind; 3] = [MetricKind::Rmse, MetricKind::Mae, MetricKind::R2];

/// Loads a region mask; the label is the file stem.
pub fn load_region_data(path: &Path) -> Result<RegionMask, RegionError> {
    Ok(read_region_mask(path)?)
}

/// Loads a single-variable prediction grid.
pub fn load_prediction_data(path: &Path) -> Result<Grid, RegionError> {
    Ok(read_grid(path, None)?)
}

/// Loads a single-variable ground-truth `y` grid.
pub fn load_true_data(path: &Path) -> Result<Grid, RegionError> {
    Ok(read_grid(path, None)?)
}

/// Progress of a [`RegionAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    /// Inputs located, nothing analysed yet.
    BoundariesDiscovered,
    /// At least one mask analysed for every model.
    PerBoundaryAnalyzed,
    /// Summary tables written.
    Aggregated,
}

/// Tidy means of one model over one mask.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryResult {
    /// Model name.
    pub model: String,
    /// Mask label, the file stem.
    pub label: String,
    /// Per-region means for every target month.
    pub stats: MeanStatistics,
    /// CSV the table was written to.
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct TidyRow<'a> {
    model: &'a str,
    admin_level_name: &'a str,
    datetime: chrono::NaiveDate,
    region_name: &'a str,
    predicted_mean_value: f64,
    true_mean_value: f64,
}

/// Error summary of one model over every mask, region and timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalErrorRow {
    /// Model name.
    pub model: String,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Error summary of one model in one region over time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalErrorRow {
    /// Model name.
    pub model: String,
    /// Mask label.
    pub admin_level_name: String,
    /// Region name.
    pub region_name: String,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Regional mean of a per-pixel metric map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricMeanRow {
    /// Model name.
    pub model: String,
    /// Mask label.
    pub admin_level_name: String,
    /// Region name.
    pub region_name: String,
    /// Metric name.
    pub metric: String,
    /// Mean of the metric over the region's pixels.
    pub value: f64,
}

/// Output of [`RegionAnalysis::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// One row per model.
    pub global_errors: Vec<GlobalErrorRow>,
    /// One row per model, mask and region.
    pub regional_errors: Vec<RegionalErrorRow>,
    /// Every CSV written.
    pub files: Vec<PathBuf>,
}

fn summary_scores(obs: &[f64], sim: &[f64]) -> [f64; 3] {
    SUMMARY_METRICS.map(|m| m.score(&[], obs, sim))
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), RegionError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| output_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| output_error(path, e))?;
    }
    writer.flush().map_err(|e| output_error(path, e))
}

/// Drives regional aggregation over every mask and model of an experiment.
///
/// Construction discovers the inputs; [`analyze_single_boundary`] writes
/// `analysis/region_analysis/<model>/<model>_<label>.csv` for one mask and
/// [`analyze`] runs every mask and writes the summary tables.
///
/// [`analyze_single_boundary`]: Self::analyze_single_boundary
/// [`analyze`]: Self::analyze
#[derive(Debug)]
pub struct RegionAnalysis {
    kind: AnalysisKind,
    out_dir: PathBuf,
    mask_dir: PathBuf,
    test_dir: PathBuf,
    masks: Vec<PathBuf>,
    predictions: BTreeMap<String, Vec<PredictionFile>>,
    truth: BTreeMap<YearMonth, PathBuf>,
    results: Vec<BoundaryResult>,
    state: AnalysisState,
}

impl RegionAnalysis {
    /// Locates masks, predictions and ground truth for `experiment`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::MissingInput`] naming the first stage with no
    /// files.
    #[instrument(skip(data_dir), fields(data_dir = %data_dir.as_ref().display()))]
    pub fn new(
        data_dir: impl AsRef<Path>,
        experiment: &str,
        kind: AnalysisKind,
    ) -> Result<Self, RegionError> {
        let data_dir = data_dir.as_ref();
        let test_dir = data_dir.join("features").join(experiment).join("test");
        let truth = discover_truth(&test_dir)?;
        let predictions = discover_predictions(&data_dir.join("models").join(experiment))?;
        let mask_dir = kind.mask_dir(data_dir);
        let masks = discover_masks(&mask_dir, kind.stage())?;

        let out_dir = data_dir.join("analysis").join("region_analysis");
        std::fs::create_dir_all(&out_dir).map_err(|e| output_error(&out_dir, e))?;

        info!(
            %kind,
            masks = masks.len(),
            models = predictions.len(),
            truth = truth.len(),
            "region analysis inputs discovered"
        );
        Ok(Self {
            kind,
            out_dir,
            mask_dir,
            test_dir,
            masks,
            predictions,
            truth,
            results: Vec::new(),
            state: AnalysisState::BoundariesDiscovered,
        })
    }

    /// Keeps only the masks for which `keep` holds, e.g. one admin level.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::MissingInput`] if nothing is left.
    pub fn retain_masks(&mut self, keep: impl Fn(&Path) -> bool) -> Result<(), RegionError> {
        self.masks.retain(|p| keep(p));
        if self.masks.is_empty() {
            return Err(RegionError::MissingInput {
                stage: self.kind.stage(),
                path: self.mask_dir.clone(),
            });
        }
        Ok(())
    }

    /// Mask family being analysed.
    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Discovered mask files.
    pub fn masks(&self) -> &[PathBuf] {
        &self.masks
    }

    /// Names of models with predictions.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.predictions.keys().map(String::as_str)
    }

    /// `analysis/region_analysis` under the data directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Per-(model, mask) results gathered so far.
    pub fn results(&self) -> &[BoundaryResult] {
        &self.results
    }

    fn truth_path(&self, target: YearMonth) -> Result<&Path, RegionError> {
        self.truth
            .get(&target)
            .map(PathBuf::as_path)
            .ok_or_else(|| RegionError::MissingInput {
                stage: "ground truth",
                path: self
                    .test_dir
                    .join(format!("{}_{}", target.year(), target.month()))
                    .join("y.parquet"),
            })
    }

    /// Prediction and truth grids of one model, truth restricted to the
    /// prediction's coordinates.
    fn load_pairs(&self, files: &[PredictionFile]) -> Result<Vec<(Grid, Grid)>, RegionError> {
        files
            .iter()
            .map(|file| {
                let pred = load_prediction_data(&file.path)?;
                let truth = load_true_data(self.truth_path(file.target)?)?.restrict_to(
                    pred.lat(),
                    pred.lon(),
                    "ground truth",
                )?;
                if truth.time() != pred.time() {
                    return Err(RegionError::Misaligned {
                        what: format!(
                            "prediction {} is stamped {}, ground truth {}",
                            file.path.display(),
                            pred.time(),
                            truth.time()
                        ),
                    });
                }
                Ok((pred, truth))
            })
            .collect()
    }

    /// Computes per-timestep per-region means of every model for the mask
    /// at `mask_path` and writes one table per model.
    ///
    /// Re-analysing a mask replaces that mask's results only.
    pub fn analyze_single_boundary(&mut self, mask_path: &Path) -> Result<Vec<PathBuf>, RegionError> {
        let mask = load_region_data(mask_path)?;
        let label = mask.label().to_string();
        let _span = info_span!("boundary", %label).entered();

        let mut fresh = Vec::new();
        for (model, files) in &self.predictions {
            let mut stats = MeanStatistics::default();
            for (pred, truth) in self.load_pairs(files)? {
                let region = mask.restrict_to(pred.lat(), pred.lon())?;
                stats.extend(compute_mean_statistics(&region, &pred, &truth, pred.time())?);
            }

            let dir = self.out_dir.join(model);
            std::fs::create_dir_all(&dir).map_err(|e| output_error(&dir, e))?;
            let path = dir.join(format!("{model}_{label}.csv"));
            stats.write_csv(&path)?;
            info!(%model, rows = stats.len(), path = %path.display(), "wrote regional means");

            fresh.push(BoundaryResult {
                model: model.clone(),
                label: label.clone(),
                stats,
                path,
            });
        }

        self.results.retain(|r| r.label != label);
        let written = fresh.iter().map(|r| r.path.clone()).collect();
        self.results.extend(fresh);
        self.state = AnalysisState::PerBoundaryAnalyzed;
        Ok(written)
    }

    /// Analyses every mask, then writes the concatenated table and the
    /// global and regional error summaries.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Cardinality`] if models disagree on the number
    /// of rows for a mask. Files written before a failure are kept.
    #[instrument(skip_all, fields(masks = self.masks.len()))]
    pub fn analyze(&mut self) -> Result<AnalysisSummary, RegionError> {
        for mask in self.masks.clone() {
            self.analyze_single_boundary(&mask)?;
        }
        self.aggregate()
    }

    fn check_cardinality(&self) -> Result<(), RegionError> {
        let mut expected: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.results {
            let want = *expected.entry(r.label.as_str()).or_insert(r.stats.len());
            if r.stats.len() != want {
                return Err(RegionError::Cardinality {
                    model: r.model.clone(),
                    label: r.label.clone(),
                    expected: want,
                    got: r.stats.len(),
                });
            }
        }
        Ok(())
    }

    fn aggregate(&mut self) -> Result<AnalysisSummary, RegionError> {
        self.check_cardinality()?;
        self.results
            .sort_by(|a, b| (&a.model, &a.label).cmp(&(&b.model, &b.label)));

        let all_path = self.out_dir.join(ALL_PREDICTIONS_FILE);
        write_rows(
            &all_path,
            self.results.iter().flat_map(|r| {
                (0..r.stats.len()).map(move |i| TidyRow {
                    model: &r.model,
                    admin_level_name: &r.label,
                    datetime: r.stats.datetimes[i],
                    region_name: &r.stats.region_names[i],
                    predicted_mean_value: r.stats.predicted_mean_values[i],
                    true_mean_value: r.stats.true_mean_values[i],
                })
            }),
        )?;

        let mut by_model: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        let mut regional = Vec::new();
        for r in &self.results {
            let entry = by_model.entry(r.model.as_str()).or_default();
            entry.0.extend(&r.stats.true_mean_values);
            entry.1.extend(&r.stats.predicted_mean_values);

            let mut by_region: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
            for row in 0..r.stats.len() {
                let e = by_region.entry(r.stats.region_names[row].as_str()).or_default();
                e.0.push(r.stats.true_mean_values[row]);
                e.1.push(r.stats.predicted_mean_values[row]);
            }
            for (region, (obs, sim)) in by_region {
                let [rmse, mae, r2] = summary_scores(&obs, &sim);
                regional.push(RegionalErrorRow {
                    model: r.model.clone(),
                    admin_level_name: r.label.clone(),
                    region_name: region.to_string(),
                    rmse,
                    mae,
                    r2,
                });
            }
        }
        let global: Vec<GlobalErrorRow> = by_model
            .into_iter()
            .map(|(model, (obs, sim))| {
                let [rmse, mae, r2] = summary_scores(&obs, &sim);
                GlobalErrorRow {
                    model: model.to_string(),
                    rmse,
                    mae,
                    r2,
                }
            })
            .collect();

        let global_path = self.out_dir.join(GLOBAL_ERRORS_FILE);
        write_rows(&global_path, &global)?;
        let regional_path = self.out_dir.join(REGIONAL_ERRORS_FILE);
        write_rows(&regional_path, &regional)?;

        self.state = AnalysisState::Aggregated;
        info!(models = global.len(), regions = regional.len(), "region analysis aggregated");
        Ok(AnalysisSummary {
            global_errors: global,
            regional_errors: regional,
            files: vec![all_path, global_path, regional_path],
        })
    }

    /// Scores every pixel over time with each metric, averages the maps
    /// inside every region of every mask and writes the result.
    #[instrument(skip_all, fields(metrics = metrics.len()))]
    pub fn analyze_metric_maps(&self, metrics: &[MetricKind]) -> Result<PathBuf, RegionError> {
        let masks = self
            .masks
            .iter()
            .map(|p| load_region_data(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::new();
        for (model, files) in &self.predictions {
            let (preds, truths): (Vec<Grid>, Vec<Grid>) = self.load_pairs(files)?.into_iter().unzip();
            let Some(first) = preds.first() else {
                continue;
            };
            let restricted = masks
                .iter()
                .map(|m| m.restrict_to(first.lat(), first.lon()))
                .collect::<Result<Vec<_>, _>>()?;

            for &metric in metrics {
                let map = spatial_metric(metric, &preds, &truths)?;
                for mask in &restricted {
                    for (region_name, value) in region_metric_means(mask, &map)? {
                        rows.push(MetricMeanRow {
                            model: model.clone(),
                            admin_level_name: mask.label().to_string(),
                            region_name,
                            metric: metric.name().to_string(),
                            value,
                        });
                    }
                }
                debug!(%model, %metric, "metric map averaged");
            }
        }

        let path = self.out_dir.join(METRIC_MEANS_FILE);
        write_rows(&path, &rows)?;
        Ok(path)
    }
}
