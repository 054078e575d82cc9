// curator/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use curator_core::domain::DatasetVariant;

#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Validate raw data lake records and publish curated, partitioned Parquet", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the pipeline (Read -> Validate -> Transform -> Write -> Catalog)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Run a single dataset (weather | sensor-readings)
        #[arg(long)]
        only: Option<DatasetVariant>,
    },

    /// 🧪 Validates raw datasets without writing curated output
    Validate {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Validate a single dataset (weather | sensor-readings)
        #[arg(long)]
        only: Option<DatasetVariant>,

        /// Exit with error if any expectation fails or a dataset cannot be read
        #[arg(long)]
        check: bool,
    },
}

/// Variants selected by `--only`, all of them by default.
pub fn selected_variants(only: Option<DatasetVariant>) -> Vec<DatasetVariant> {
    match only {
        Some(v) => vec![v],
        None => DatasetVariant::ALL.to_vec(),
    }
}
