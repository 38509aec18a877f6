//! Destinations for stratified examples.

use std::path::{Path, PathBuf};

use drought_calendar::YearMonth;
use drought_io::{IoError, WriterConfig, write_series};
use tracing::debug;

use crate::error::EngineerError;
use crate::normalize::{NORMALIZATION_FILE, NormalizationRecord};
use crate::stratify::{DatasetType, StratifiedExample};

/// Receives the products of an engineering run.
pub trait ExampleSink {
    /// Persists one example.
    fn save(&mut self, example: &StratifiedExample) -> Result<(), EngineerError>;

    /// Persists the experiment's normalization record.
    fn save_normalization(&mut self, record: &NormalizationRecord) -> Result<(), EngineerError>;
}

/// `<root>/<train|test>/<year>_<month>`, month without zero padding.
pub fn example_dir(root: &Path, dataset_type: DatasetType, target: YearMonth) -> PathBuf {
    root.join(dataset_type.as_str())
        .join(format!("{}_{}", target.year(), target.month()))
}

/// Writes examples as `x.parquet` / `y.parquet` under an experiment's feature
/// directory (`<data>/features/<experiment>`).
#[derive(Debug, Clone)]
pub struct FeatureWriter {
    root: PathBuf,
    config: WriterConfig,
}

impl FeatureWriter {
    /// Creates a writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, config: WriterConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// The feature directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn create_dir(path: &Path) -> Result<(), EngineerError> {
        std::fs::create_dir_all(path).map_err(|e| {
            EngineerError::Io(IoError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }
}

impl ExampleSink for FeatureWriter {
    fn save(&mut self, example: &StratifiedExample) -> Result<(), EngineerError> {
        let dir = example_dir(&self.root, example.dataset_type, example.target);
        Self::create_dir(&dir)?;
        write_series(&dir.join("x.parquet"), &example.x, &self.config)?;
        write_series(&dir.join("y.parquet"), &example.y, &self.config)?;
        debug!(dir = %dir.display(), "saved example");
        Ok(())
    }

    fn save_normalization(&mut self, record: &NormalizationRecord) -> Result<(), EngineerError> {
        Self::create_dir(&self.root)?;
        record.save_json(&self.root.join(NORMALIZATION_FILE))
    }
}

/// Keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Saved examples in save order.
    pub examples: Vec<StratifiedExample>,
    /// The last saved normalization record.
    pub normalization: Option<NormalizationRecord>,
}

impl MemorySink {
    /// Examples of one partition.
    pub fn of_type(&self, dataset_type: DatasetType) -> impl Iterator<Item = &StratifiedExample> {
        self.examples
            .iter()
            .filter(move |e| e.dataset_type == dataset_type)
    }
}

impl ExampleSink for MemorySink {
    fn save(&mut self, example: &StratifiedExample) -> Result<(), EngineerError> {
        self.examples.push(example.clone());
        Ok(())
    }

    fn save_normalization(&mut self, record: &NormalizationRecord) -> Result<(), EngineerError> {
        self.normalization = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_dir_layout() {
        let dir = example_dir(
            Path::new("data/features/one_month_forecast"),
            DatasetType::Test,
            YearMonth::new(2018, 1).unwrap(),
        );
        assert_eq!(
            dir,
            PathBuf::from("data/features/one_month_forecast/test/2018_1")
        );
    }
}
