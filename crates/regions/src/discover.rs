//! Locating masks, predictions and ground truth under a data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use drought_calendar::YearMonth;
use tracing::debug;

use crate::error::RegionError;

/// Extension of every grid file.
pub const GRID_EXTENSION: &str = "parquet";

/// A saved prediction grid of one model for one target month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionFile {
    /// Model directory name.
    pub model: String,
    /// Target month.
    pub target: YearMonth,
    /// Path of the grid.
    pub path: PathBuf,
}

/// File name of a prediction grid, `preds_<year>_<month>.parquet`.
pub fn prediction_file_name(target: YearMonth) -> String {
    format!("preds_{}_{}.{GRID_EXTENSION}", target.year(), target.month())
}

fn parse_year_month(s: &str) -> Option<YearMonth> {
    let (year, month) = s.split_once('_')?;
    YearMonth::new(year.parse().ok()?, month.parse().ok()?).ok()
}

/// Target month of a `preds_<year>_<month>.parquet` name.
pub fn parse_prediction_name(name: &str) -> Option<YearMonth> {
    let stem = name.strip_suffix(&format!(".{GRID_EXTENSION}"))?;
    parse_year_month(stem.strip_prefix("preds_")?)
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    paths
}

fn is_grid_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|e| e == GRID_EXTENSION)
}

/// Mask files in `dir`, sorted by name.
///
/// # Errors
///
/// Returns [`RegionError::MissingInput`] naming `stage` if there are none.
pub fn discover_masks(dir: &Path, stage: &'static str) -> Result<Vec<PathBuf>, RegionError> {
    let masks: Vec<PathBuf> = entries(dir).into_iter().filter(|p| is_grid_file(p)).collect();
    if masks.is_empty() {
        return Err(RegionError::MissingInput {
            stage,
            path: dir.to_path_buf(),
        });
    }
    debug!(dir = %dir.display(), n = masks.len(), "discovered masks");
    Ok(masks)
}

/// Prediction files per model under `models/<experiment>`.
///
/// Each subdirectory is a model; files not named
/// `preds_<year>_<month>.parquet` are ignored. Models without predictions
/// are skipped.
///
/// # Errors
///
/// Returns [`RegionError::MissingInput`] if no model has predictions.
pub fn discover_predictions(
    experiment_dir: &Path,
) -> Result<BTreeMap<String, Vec<PredictionFile>>, RegionError> {
    let mut out = BTreeMap::new();
    for model_dir in entries(experiment_dir).into_iter().filter(|p| p.is_dir()) {
        let model = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut files: Vec<PredictionFile> = entries(&model_dir)
            .into_iter()
            .filter(|p| is_grid_file(p))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let target = parse_prediction_name(name)?;
                Some(PredictionFile {
                    model: model.clone(),
                    target,
                    path,
                })
            })
            .collect();
        if files.is_empty() {
            debug!(%model, "no predictions, skipped");
            continue;
        }
        files.sort_by_key(|f| f.target);
        out.insert(model, files);
    }
    if out.is_empty() {
        return Err(RegionError::MissingInput {
            stage: "model predictions",
            path: experiment_dir.to_path_buf(),
        });
    }
    Ok(out)
}

/// Ground-truth `y` grids under `features/<experiment>/test`, keyed by the
/// `<year>_<month>` directory name.
///
/// # Errors
///
/// Returns [`RegionError::MissingInput`] if there are none.
pub fn discover_truth(test_dir: &Path) -> Result<BTreeMap<YearMonth, PathBuf>, RegionError> {
    let out: BTreeMap<YearMonth, PathBuf> = entries(test_dir)
        .into_iter()
        .filter_map(|dir| {
            let target = parse_year_month(dir.file_name()?.to_str()?)?;
            let y = dir.join(format!("y.{GRID_EXTENSION}"));
            y.is_file().then_some((target, y))
        })
        .collect();
    if out.is_empty() {
        return Err(RegionError::MissingInput {
            stage: "ground truth",
            path: test_dir.to_path_buf(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prediction_names() {
        let ym = YearMonth::new(2018, 3).unwrap();
        assert_eq!(prediction_file_name(ym), "preds_2018_3.parquet");
        assert_eq!(parse_prediction_name("preds_2018_3.parquet"), Some(ym));
        assert_eq!(parse_prediction_name("preds_2018_13.parquet"), None);
        assert_eq!(parse_prediction_name("preds_2018_3.nc"), None);
        assert_eq!(parse_prediction_name("x_2018_3.parquet"), None);
    }

    #[test]
    fn discovers_predictions_and_truth() {
        let root = tempfile::tempdir().unwrap();
        let exp = root.path().join("models").join("one_month_forecast");
        fs::create_dir_all(exp.join("ealstm")).unwrap();
        fs::create_dir_all(exp.join("empty_model")).unwrap();
        for name in ["preds_2018_2.parquet", "preds_2018_1.parquet", "notes.txt"] {
            fs::write(exp.join("ealstm").join(name), b"").unwrap();
        }
        let test = root.path().join("features").join("one_month_forecast").join("test");
        for dir in ["2018_1", "2018_2", "2018_3"] {
            fs::create_dir_all(test.join(dir)).unwrap();
        }
        fs::write(test.join("2018_1").join("y.parquet"), b"").unwrap();
        fs::write(test.join("2018_2").join("y.parquet"), b"").unwrap();

        let preds = discover_predictions(&exp).unwrap();
        assert_eq!(preds.keys().collect::<Vec<_>>(), vec!["ealstm"]);
        let months: Vec<u8> = preds["ealstm"].iter().map(|f| f.target.month()).collect();
        assert_eq!(months, vec![1, 2]);

        let truth = discover_truth(&test).unwrap();
        assert_eq!(truth.len(), 2);
    }

    #[test]
    fn empty_inputs_fail_fast() {
        let root = tempfile::tempdir().unwrap();
        let err = discover_masks(&root.path().join("absent"), "region boundaries").unwrap_err();
        assert!(matches!(err, RegionError::MissingInput { stage: "region boundaries", .. }));
        assert!(matches!(
            discover_predictions(root.path()),
            Err(RegionError::MissingInput { stage: "model predictions", .. })
        ));
        assert!(matches!(
            discover_truth(root.path()),
            Err(RegionError::MissingInput { stage: "ground truth", .. })
        ));
    }
}
