// curator-core/src/application/validation.rs

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::dataset::Dataset;
use crate::domain::quality::{ValidationReport, validate_dataset};
use crate::domain::variant::DatasetVariant;
use crate::ports::source::RawSource;

/// Runs the variant's fixed rule set against `dataset` and logs the report.
pub fn validate_variant(variant: DatasetVariant, dataset: &Dataset) -> ValidationReport {
    let report = validate_dataset(dataset, variant.report_name(), &variant.rules());
    log_report(&report);
    report
}

/// One JSON field per report; failed reports go out at error level, the run carries on.
pub fn log_report(report: &ValidationReport) {
    let json = serde_json::to_string(report).unwrap_or_else(|e| format!("<unserializable: {}>", e));
    if report.success() {
        info!(
            dataset = report.dataset(),
            passed = report.expectations_passed(),
            report = %json,
            "Validation passed"
        );
    } else {
        error!(
            dataset = report.dataset(),
            failed = report.expectations_failed(),
            report = %json,
            "Validation failed, continuing"
        );
    }
}

/// Outcome of a read-only validation pass over one variant.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    SourceReadFailed { error: String },
    Validated { rows: usize, report: ValidationReport },
}

#[derive(Debug, Serialize)]
pub struct VariantValidation {
    pub variant: DatasetVariant,
    pub outcome: ValidationOutcome,
}

impl VariantValidation {
    pub fn report(&self) -> Option<&ValidationReport> {
        match &self.outcome {
            ValidationOutcome::Validated { report, .. } => Some(report),
            ValidationOutcome::SourceReadFailed { .. } => None,
        }
    }
}

/// Reads and validates each variant without writing anything.
pub async fn validate_variants(
    source: Arc<dyn RawSource>,
    variants: &[DatasetVariant],
) -> Vec<VariantValidation> {
    let tasks = variants.iter().map(|&variant| {
        let source = source.clone();
        async move {
            let outcome = match source.read_dataset(variant.raw_path()).await {
                Ok(dataset) => {
                    if dataset.is_empty() {
                        warn!(variant = %variant, "Raw dataset is empty");
                    }
                    ValidationOutcome::Validated {
                        rows: dataset.len(),
                        report: validate_variant(variant, &dataset),
                    }
                }
                Err(e) => {
                    warn!(variant = %variant, error = %e, "Could not read raw dataset");
                    ValidationOutcome::SourceReadFailed {
                        error: e.to_string(),
                    }
                }
            };
            VariantValidation { variant, outcome }
        }
    });

    join_all(tasks).await
}

/// True when every variant was read and every report passed.
pub fn all_passed(results: &[VariantValidation]) -> bool {
    results
        .iter()
        .all(|r| r.report().is_some_and(ValidationReport::success))
}
