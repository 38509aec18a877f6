//! # drought-engineer
//!
//! Turns a monthly gridded dataset into forecasting examples without
//! leaking test targets into training.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["GriddedSeries"] --> B["year / timestep test split"]
//!     B -->|"test dates"| C["training partition"]
//!     C --> D["calculate_normalization_values()"]
//!     B -->|"test dates"| E["stratify_training_data()"]
//!     B --> F["ExampleSink"]
//!     E --> F
//!     D --> F
//! ```
//!
//! Each example holds `pred_months` of inputs (`x`, every variable) and the
//! following month of the target variable (`y`). Windows with too little
//! history are dropped. A [`FeatureWriter`] lays examples out as
//! `<root>/<train|test>/<year>_<month>/{x,y}.parquet` next to
//! `normalizing_dict.json`.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Run configuration and split strategy |
//! | `stratify` | Single-target windows |
//! | `split` | Test split, backward training walk, leakage check |
//! | `normalize` | Normalization statistics |
//! | `writer` | Example sinks |
//! | `engineer` | Orchestration |
//! | `error` | Error types |

mod config;
mod engineer;
mod error;
mod normalize;
mod split;
mod stratify;
mod writer;

pub use config::{EngineerConfig, SplitStrategy};
pub use engineer::{EngineerReport, engineer};
pub use error::EngineerError;
pub use normalize::{
    NORMALIZATION_FILE, NormalizationRecord, VariableStats, calculate_normalization_values,
};
pub use split::{
    SplitOutcome, check_data_leakage, stratify_training_data, timestep_train_test_split,
    training_partition, year_train_test_split,
};
pub use stratify::{DatasetType, StratifiedExample, Stratifier, stratify};
pub use writer::{ExampleSink, FeatureWriter, MemorySink, example_dir};
