use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drought forecasting pipeline.
#[derive(Parser)]
#[command(
    name = "drought",
    version,
    about = "Feature engineering, baseline forecasts and regional evaluation for drought indices"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Stratify a gridded dataset into train/test examples.
    Engineer(EngineerArgs),
    /// Write persistence baseline predictions for every test example.
    Persistence(PersistenceArgs),
    /// Aggregate model predictions over region masks.
    Analyze(AnalyzeArgs),
    /// Compute station error tables, deltas and seasonal errors.
    Errors(ErrorsArgs),
}

/// Options shared by every subcommand.
#[derive(clap::Args)]
pub struct CommonArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "drought.toml")]
    pub config: PathBuf,

    /// Override the data directory from config.
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Override the experiment name from config.
    #[arg(short, long)]
    pub experiment: Option<String>,
}

/// Arguments for the `engineer` subcommand.
#[derive(clap::Args)]
pub struct EngineerArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the input dataset path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the target variable from config.
    #[arg(short, long)]
    pub target: Option<String>,
}

/// Arguments for the `persistence` subcommand.
#[derive(clap::Args)]
pub struct PersistenceArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `analyze` subcommand.
#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Mask family: `administrative` or `landcover`.
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Only analyse administrative masks of this level (`*_l<level>_*`).
    #[arg(short, long)]
    pub admin_level: Option<u8>,
}

/// Arguments for the `errors` subcommand.
#[derive(clap::Args)]
pub struct ErrorsArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the output directory from config.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the reference model for deltas.
    #[arg(short, long)]
    pub reference: Option<String>,

    /// Also compute per-season error tables.
    #[arg(long)]
    pub seasonal: bool,
}

impl CommonArgs {
    /// Loads the config file and applies the path overrides.
    pub fn load_config(&self) -> anyhow::Result<crate::config::DroughtConfig> {
        let mut config = crate::config::DroughtConfig::load(&self.config)?;
        if let Some(dir) = &self.data_dir {
            config.io.data_dir = dir.clone();
        }
        if let Some(exp) = &self.experiment {
            config.io.experiment = exp.clone();
        }
        Ok(config)
    }
}
