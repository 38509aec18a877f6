//! Families of region masks.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which set of region masks an analysis runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisKind {
    /// Administrative boundaries rasterised onto the model grid.
    #[default]
    Administrative,
    /// ESA CCI land cover classes.
    Landcover,
}

impl AnalysisKind {
    /// Directory holding the mask files, relative to the data directory.
    pub fn mask_dir(self, data_dir: &Path) -> PathBuf {
        match self {
            AnalysisKind::Administrative => data_dir.join("analysis").join("boundaries_preprocessed"),
            AnalysisKind::Landcover => data_dir
                .join("interim")
                .join("static")
                .join("esa_cci_landcover_preprocessed"),
        }
    }

    /// Name of the upstream stage, used in missing-input errors.
    pub fn stage(self) -> &'static str {
        match self {
            AnalysisKind::Administrative => "region boundaries",
            AnalysisKind::Landcover => "landcover masks",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisKind::Administrative => "administrative",
            AnalysisKind::Landcover => "landcover",
        })
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "administrative" | "admin" => Ok(AnalysisKind::Administrative),
            "landcover" => Ok(AnalysisKind::Landcover),
            other => Err(format!(
                "unknown analysis kind '{other}' (expected 'administrative' or 'landcover')"
            )),
        }
    }
}
