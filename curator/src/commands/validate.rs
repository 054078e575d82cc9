// curator/src/commands/validate.rs
//
// USE CASE: Read-only pre-flight validation of the raw datasets.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use comfy_table::Cell;
use curator_core::application::{ValidationOutcome, VariantValidation, all_passed, validate_variants};
use curator_core::domain::DatasetVariant;
use curator_core::infrastructure::adapters::LocalRawSource;
use curator_core::infrastructure::config::load_project_config;

use crate::cli::selected_variants;
use crate::commands::{new_table, status_cell};

pub async fn execute(
    project_dir: PathBuf,
    only: Option<DatasetVariant>,
    check: bool,
) -> anyhow::Result<()> {
    println!("🧪 Validating raw datasets...");

    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    let source = Arc::new(LocalRawSource::new(config.datalake_dir(&project_dir)));

    let results = validate_variants(source, &selected_variants(only)).await;
    for result in &results {
        print_result(result);
    }

    if all_passed(&results) {
        println!("\n✅ All expectations met.");
    } else if check {
        eprintln!("\n💥 --check mode: Failing due to unmet expectations.");
        std::process::exit(1);
    } else {
        println!("\n⚠️  Some expectations failed (the pipeline would still write).");
    }

    Ok(())
}

fn print_result(result: &VariantValidation) {
    match &result.outcome {
        ValidationOutcome::SourceReadFailed { error } => {
            eprintln!("\n❌ {}: {}", result.variant, error);
        }
        ValidationOutcome::Validated { rows, report } => {
            println!(
                "\n📋 {} ({} rows): {}/{} expectations passed",
                report.dataset(),
                rows,
                report.expectations_passed(),
                report.expectations_evaluated()
            );

            let mut table = new_table(&["Expectation", "Column", "Result", "Details"]);
            for r in report.results() {
                let details = r
                    .details()
                    .iter()
                    .filter(|(k, _)| k.as_str() != "column")
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(" ");
                table.add_row(vec![
                    Cell::new(r.expectation_type()),
                    Cell::new(r.column().unwrap_or("-")),
                    status_cell(if r.success() { "PASS" } else { "FAIL" }, r.success()),
                    Cell::new(details),
                ]);
            }
            println!("{table}");
        }
    }
}
