//! # drought-models
//!
//! Baseline forecasts over engineered examples and batch chunking for
//! trainable models.
//!
//! [`Persistence`] reads every `features/<experiment>/test/<year>_<month>`
//! example and predicts the target as its last observed month, writing
//! `models/<experiment>/persistence/preds_<year>_<month>.parquet` so the
//! region analysis can score it next to other models.
//!
//! [`chunk_array`] splits one or more aligned inputs and their targets into
//! `max(1, n / batch_size)` near-equal batches; [`chunk_array_shuffled`] also
//! shuffles the batch order, applying one permutation to every array.

mod chunk;
mod error;
mod persistence;

pub use chunk::{Batch, chunk_array, chunk_array_shuffled, section_bounds};
pub use error::ModelError;
pub use persistence::{PREDICTION_VARIABLE, Persistence, persistence_forecast};
