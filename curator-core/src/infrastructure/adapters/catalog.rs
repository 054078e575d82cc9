// curator-core/src/infrastructure/adapters/catalog.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::error::CuratorError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::catalog::{CatalogClient, CatalogTable};

const CATALOG_DIR: &str = "_catalog";

/// Catalog entry as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub database: String,
    pub table: String,
    pub location: String,
    pub partition_column: String,
    pub partitions: Vec<String>,
    pub refreshed_at: DateTime<Utc>,
}

/// Local stand-in for a metastore: one JSON document per table under
/// `<root>/_catalog/<database>/<table>.json`, rebuilt from the partition
/// directories on every refresh (the equivalent of `MSCK REPAIR TABLE`).
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn entry_path(&self, table: &CatalogTable) -> PathBuf {
        self.root
            .join(CATALOG_DIR)
            .join(&table.database)
            .join(format!("{}.json", table.name))
    }

    /// Reads back a table entry, `None` if the table was never registered.
    pub fn load(&self, table: &CatalogTable) -> Result<Option<TableEntry>, CuratorError> {
        let path = self.entry_path(table);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

fn registration_error(table: &CatalogTable, reason: impl Into<String>) -> DomainError {
    DomainError::CatalogRegistration {
        table: table.qualified_name(),
        reason: reason.into(),
    }
}

fn scan_partitions(location: &Path, partition_column: &str) -> std::io::Result<Vec<String>> {
    let prefix = format!("{}=", partition_column);
    let mut partitions = Vec::new();
    for entry in fs::read_dir(location)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(value) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_prefix(&prefix))
        {
            partitions.push(value.to_string());
        }
    }
    partitions.sort();
    Ok(partitions)
}

#[async_trait]
impl CatalogClient for FileCatalog {
    #[instrument(skip(self, table), fields(table = %table.qualified_name()))]
    async fn refresh_partitions(&self, table: &CatalogTable) -> Result<(), CuratorError> {
        let location = self.root.join(&table.location);
        if !location.is_dir() {
            return Err(registration_error(
                table,
                format!("location {:?} does not exist", location),
            )
            .into());
        }

        let partitions = scan_partitions(&location, &table.partition_column)
            .map_err(|e| registration_error(table, e.to_string()))?;

        let entry = TableEntry {
            database: table.database.clone(),
            table: table.name.clone(),
            location: table.location.clone(),
            partition_column: table.partition_column.clone(),
            partitions,
            refreshed_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        atomic_write(self.entry_path(table), json)
            .map_err(|e| registration_error(table, e.to_string()))?;

        info!(
            statement = %format!("MSCK REPAIR TABLE {}", table.qualified_name()),
            partitions = entry.partitions.len(),
            "Catalog partitions refreshed"
        );
        Ok(())
    }
}
