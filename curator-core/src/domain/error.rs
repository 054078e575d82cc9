// curator-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Failed to read raw dataset at '{path}': {reason}")]
    #[diagnostic(
        code(curator::domain::source_read),
        help("The dataset run is skipped. Check that the raw path exists and holds newline-delimited JSON.")
    )]
    SourceRead { path: String, reason: String },

    #[error("Catalog registration failed for table '{table}': {reason}")]
    #[diagnostic(
        code(curator::domain::catalog),
        help("Curated files were written but are not queryable until the partitions are registered.")
    )]
    CatalogRegistration { table: String, reason: String },

    #[error("Partition key '{0}' cannot be used as a directory name")]
    #[diagnostic(
        code(curator::domain::partition_key),
        help("Partition keys are the first 10 characters of the 'timestamp' field.")
    )]
    UnsafePartitionKey(String),

    #[error("Unknown dataset variant: {0}")]
    #[diagnostic(
        code(curator::domain::variant),
        help("Expected one of: weather, sensor-readings.")
    )]
    UnknownVariant(String),
}
