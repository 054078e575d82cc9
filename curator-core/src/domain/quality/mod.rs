// curator-core/src/domain/quality/mod.rs

pub mod classifier;
pub mod expectation;
pub mod report;

// Re-exports
pub use classifier::{QualityScore, classify};
pub use expectation::{Expectation, ExpectationResult, Tally};
pub use report::{ValidationRecord, ValidationReport, Validator, validate_dataset};
