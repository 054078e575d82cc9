// curator/src/commands/run.rs
//
// USE CASE: Run the curation pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use comfy_table::Cell;
use curator_core::application::{PipelineSettings, RunSummary, TransformPipeline, VariantOutcome};
use curator_core::domain::DatasetVariant;
use curator_core::infrastructure::adapters::{FileCatalog, LocalRawSource, ParquetSink};
use curator_core::infrastructure::config::load_project_config;
use tracing::{debug, error};

use crate::cli::selected_variants;
use crate::commands::{new_table, status_cell, warn_cell};

pub async fn execute(project_dir: PathBuf, only: Option<DatasetVariant>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    let datalake = config.datalake_dir(&project_dir);
    println!(
        "   Project: {} [{}] → database `{}`",
        config.name, config.environment, config.database_name
    );
    println!("   Data lake: {}", datalake.display());

    // B. Wire the local adapters (dependency injection)
    let settings = PipelineSettings::from_config(&config, &project_dir);
    debug!(
        datalake = ?datalake,
        target = ?settings.target_dir,
        "Local adapters wired"
    );
    let pipeline = TransformPipeline::new(
        Arc::new(LocalRawSource::new(&datalake)),
        Arc::new(ParquetSink::new(&datalake)),
        Arc::new(FileCatalog::new(&datalake)),
        settings,
    );

    // C. Run the Pipeline (Application Layer)
    let variants = selected_variants(only);
    println!("🟢 Curating {} dataset(s)...", variants.len());

    match pipeline.run(&variants).await {
        Ok(summary) => {
            print_summary(&summary);
            let warnings = summary.quality_warnings().count();
            let failures = summary.source_failures().count();
            if warnings > 0 {
                println!("⚠️  {} dataset(s) written with quality warnings.", warnings);
            }
            if failures > 0 {
                println!("⚠️  {} dataset(s) skipped: raw input unreadable.", failures);
            }
            println!("\n✨ Done in {:.2?}", start.elapsed());
        }
        Err(e) => {
            error!(error = %e, "Curation run aborted");
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let mut table = new_table(&["Dataset", "Status", "Expectations", "Rows", "Partitions"]);

    for run in &summary.variants {
        let row = match &run.outcome {
            VariantOutcome::Completed { validation, write } => vec![
                Cell::new(run.variant),
                status_cell("written", true),
                status_cell(
                    &format!("{}/{} passed", validation.passed, validation.evaluated),
                    validation.success,
                ),
                Cell::new(write.rows_written),
                Cell::new(write.partitions.join(", ")),
            ],
            VariantOutcome::SkippedEmpty => vec![
                Cell::new(run.variant),
                warn_cell("empty, skipped"),
                Cell::new("-"),
                Cell::new(0),
                Cell::new("-"),
            ],
            VariantOutcome::SourceReadFailed { error } => vec![
                Cell::new(run.variant),
                status_cell("read failed", false),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(error),
            ],
        };
        table.add_row(row);
    }

    println!("{table}");
}
