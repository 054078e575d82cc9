// curator-core/src/ports/sink.rs

use crate::domain::dataset::Dataset;
use crate::error::CuratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub rows_written: usize,
    /// Partition values replaced by this write, sorted.
    pub partitions: Vec<String>,
}

#[async_trait]
pub trait CuratedSink: Send + Sync {
    /// Writes `dataset` under `logical_path`, split by `partition_column`.
    /// Every partition present in `dataset` is fully replaced; other partitions are left alone.
    async fn write_partitioned(
        &self,
        logical_path: &str,
        dataset: &Dataset,
        partition_column: &str,
    ) -> Result<WriteSummary, CuratorError>;
}
