// curator-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuratorError {
    // --- DOMAIN ERRORS (source reads, catalog registration, partition keys) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, columnar engine) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl CuratorError {
    /// True for failures the pipeline absorbs locally (the dataset run is skipped).
    pub fn is_source_read(&self) -> bool {
        matches!(self, CuratorError::Domain(DomainError::SourceRead { .. }))
    }
}

impl From<std::io::Error> for CuratorError {
    fn from(err: std::io::Error) -> Self {
        CuratorError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_json::Error> for CuratorError {
    fn from(err: serde_json::Error) -> Self {
        CuratorError::Infrastructure(InfrastructureError::Json(err))
    }
}
