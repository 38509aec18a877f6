//! Hydrological error metrics for drought and streamflow forecasts.
//!
//! Metrics are a closed set, [`MetricKind`], each fixing a value transform
//! and a base function from [`functions`]. Station predictions are scored
//! per station into an [`ErrorTable`]; tables of several models are
//! compared against a reference model with [`error_deltas`], optionally per
//! meteorological season.
//!
//! ```mermaid
//! flowchart LR
//!     CSV[station_id,time,obs,sim] --> SD[StationData]
//!     SD --> CE[calculate_errors]
//!     CE --> ET[ErrorTable]
//!     ET --> D[error_deltas]
//!     SD --> S[seasonal_errors]
//!     S --> D
//! ```
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use drought_metrics::{MetricKind, StationData, StationRecord, calculate_errors};
//!
//! let records = (1..=5).map(|day| StationRecord {
//!     station_id: "1001".to_string(),
//!     time: NaiveDate::from_ymd_opt(2005, 3, day).unwrap(),
//!     obs: Some(day as f64),
//!     sim: Some(day as f64),
//! });
//! let data = StationData::from_records(records);
//! let table = calculate_errors(&data, &[MetricKind::Nse, MetricKind::Rmse]);
//!
//! assert_eq!(table.get("1001", MetricKind::Nse), Some(1.0));
//! assert_eq!(table.get("1001", MetricKind::Rmse), Some(0.0));
//! ```

mod delta;
mod error;
pub mod functions;
mod kind;
mod mam30;
mod nested;
mod seasonal;
mod station;

pub use delta::{DeltaTable, error_deltas, write_metric_deltas};
pub use error::MetricError;
pub use kind::{EPSILON, MetricKind, Transform};
pub use mam30::{MIN_WATER_YEARS, WINDOW, mam30, mam30_ape};
pub use nested::{NestedTable, Selection};
pub use seasonal::{SeasonalErrors, seasonal_deltas, seasonal_errors};
pub use station::{ErrorTable, StationData, StationRecord, StationSeries, calculate_errors};
