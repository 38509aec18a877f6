//! Regional evaluation of gridded drought forecasts.
//!
//! A region mask assigns every pixel an integer region id and carries an
//! id to name lookup. For every model, mask and target month the analysis
//! averages predicted and true values inside each region and writes a tidy
//! table; summaries of those tables and regional means of per-pixel metric
//! maps are written alongside.
//!
//! ```mermaid
//! flowchart LR
//!     M[masks] --> RA[RegionAnalysis]
//!     P[models/exp/model/preds_y_m] --> RA
//!     T[features/exp/test/y_m/y] --> RA
//!     RA --> C[compute_mean_statistics]
//!     C --> CSV[model_label.csv]
//!     CSV --> S[global and regional errors]
//! ```

mod aggregate;
mod analysis;
mod discover;
mod error;
mod kind;

pub use aggregate::{
    MeanStatistics, RegionRow, compute_mean_statistics, region_metric_means, spatial_metric,
};
pub use analysis::{
    ALL_PREDICTIONS_FILE, AnalysisState, AnalysisSummary, BoundaryResult, GLOBAL_ERRORS_FILE,
    GlobalErrorRow, METRIC_MEANS_FILE, MetricMeanRow, REGIONAL_ERRORS_FILE, RegionAnalysis,
    RegionalErrorRow, load_prediction_data, load_region_data, load_true_data,
};
pub use discover::{
    GRID_EXTENSION, PredictionFile, discover_masks, discover_predictions, discover_truth,
    parse_prediction_name, prediction_file_name,
};
pub use error::RegionError;
pub use kind::AnalysisKind;
