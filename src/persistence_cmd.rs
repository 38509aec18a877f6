//! Persistence command: baseline predictions for every test example.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use drought_models::Persistence;

use crate::cli::PersistenceArgs;
use crate::convert;

/// Predict every test example of the experiment with its last observed month.
pub fn run(args: PersistenceArgs) -> Result<()> {
    let _cmd = info_span!("persistence").entered();
    let config = args.common.load_config()?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    let model = Persistence::new(&config.io.data_dir, &config.io.experiment)
        .with_writer_config(writer_cfg);
    let written = model
        .predict()
        .with_context(|| format!("persistence failed for experiment {}", config.io.experiment))?;

    info!(n = written.len(), dir = %model.model_dir().display(), "persistence predictions written");
    Ok(())
}
