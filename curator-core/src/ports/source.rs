// curator-core/src/ports/source.rs

// Raw storage as the pipeline sees it: a logical path in, a dataset out.
// Where the bytes live (object store, local disk, a test fixture) is the adapter's business.

use crate::domain::dataset::Dataset;
use crate::error::CuratorError;
use async_trait::async_trait;

#[async_trait]
pub trait RawSource: Send + Sync {
    /// Loads every record under `logical_path` (e.g. `raw/weather/`).
    /// Unreadable or corrupt input must come back as `DomainError::SourceRead`.
    async fn read_dataset(&self, logical_path: &str) -> Result<Dataset, CuratorError>;
}
