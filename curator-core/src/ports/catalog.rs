// curator-core/src/ports/catalog.rs

use crate::error::CuratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A curated table as the metadata catalog knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub database: String,
    pub name: String,
    /// Logical location of the table's files (e.g. `curated/weather/`).
    pub location: String,
    pub partition_column: String,
}

impl CatalogTable {
    pub fn qualified_name(&self) -> String {
        format!("`{}`.{}", self.database, self.name)
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Makes newly written partitions queryable. Must be idempotent.
    async fn refresh_partitions(&self, table: &CatalogTable) -> Result<(), CuratorError>;
}
