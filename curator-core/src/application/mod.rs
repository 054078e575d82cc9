// curator-core/src/application/mod.rs

pub mod pipeline;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use curator_core::application::{TransformPipeline, validate_variants};`
// without knowing the file layout.

pub use pipeline::{
    PipelineSettings, RunSummary, TransformPipeline, ValidationCounts, VariantOutcome, VariantRun,
};
pub use validation::{ValidationOutcome, VariantValidation, all_passed, validate_variants};
