// curator-core/src/infrastructure/adapters/parquet.rs

use async_trait::async_trait;
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::config::TableParquetOptions;
use datafusion::dataframe::DataFrameWriteOptions;
use datafusion::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::dataset::{Dataset, Record, Value, ValueKind};
use crate::domain::error::DomainError;
use crate::domain::transform::DEFAULT_PARTITION;
use crate::error::CuratorError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{atomic_write, remove_dir_if_exists};
use crate::ports::sink::{CuratedSink, WriteSummary};

const STAGING_FILE: &str = "staged.json";
const STAGING_PREFIX: &str = ".staging-";
const DEFAULT_COMPRESSION: &str = "snappy";

/// Curated storage as a hive-partitioned Parquet tree:
/// `<root>/<logical_path>/<column>=<value>/<file>.parquet`.
///
/// Writes use dynamic partition overwrite: each partition present in the
/// incoming dataset is replaced, the rest of the table is untouched. New files
/// land in a hidden staging directory next to the partitions and are swapped in
/// only once the whole write has succeeded.
pub struct ParquetSink {
    ctx: Arc<SessionContext>,
    root: PathBuf,
    compression: String,
}

impl ParquetSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            ctx: Arc::new(SessionContext::new()),
            root: root.into(),
            compression: DEFAULT_COMPRESSION.to_string(),
        }
    }

    /// Parquet codec, in DataFusion's notation (`snappy`, `zstd(3)`, ...).
    pub fn with_compression(mut self, codec: impl Into<String>) -> Self {
        self.compression = codec.into();
        self
    }

    fn table_dir(&self, logical_path: &str) -> Result<PathBuf, CuratorError> {
        let relative = Path::new(logical_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(CuratorError::UnsafePath(logical_path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Writes the whole dataset as partitioned Parquet under `output_dir`.
    async fn stage_and_write(
        &self,
        output_dir: &Path,
        dataset: &Dataset,
        partition_column: &str,
    ) -> Result<(), InfrastructureError> {
        // Schema is decided over every record, never sampled
        let schema = curated_schema(dataset, partition_column);

        let scratch = tempfile::Builder::new().prefix("curator-staging").tempdir()?;
        let staged_path = scratch.path().join(STAGING_FILE);
        let mut buffer = Vec::new();
        for record in dataset {
            let row = staged_record(record, &schema, partition_column);
            serde_json::to_writer(&mut buffer, &row)?;
            buffer.push(b'\n');
        }
        atomic_write(&staged_path, &buffer)?;

        let staged = staged_path.to_str().ok_or_else(|| {
            InfrastructureError::ConfigError(format!("Non UTF-8 staging path: {:?}", staged_path))
        })?;
        let output = format!("{}/", output_dir.display());

        let df = self
            .ctx
            .read_json(staged, NdJsonReadOptions::default().schema(&schema))
            .await?;

        let mut parquet_options = TableParquetOptions::default();
        parquet_options.global.compression = Some(self.compression.clone());

        df.write_parquet(
            &output,
            DataFrameWriteOptions::new().with_partition_by(vec![partition_column.to_string()]),
            Some(parquet_options),
        )
        .await?;

        Ok(())
    }
}

/// Arrow type of a curated column, decided over every non-null value:
/// all numbers give Float64, all booleans give Boolean, anything else
/// (strings, mixed kinds, only nulls) gives Utf8.
pub fn column_type(dataset: &Dataset, column: &str) -> DataType {
    let mut kinds = dataset
        .iter()
        .filter_map(|r| r.get(column))
        .filter(|v| !v.is_null())
        .map(Value::kind);

    match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => match first {
            ValueKind::Number => DataType::Float64,
            ValueKind::Boolean => DataType::Boolean,
            _ => DataType::Utf8,
        },
        _ => DataType::Utf8,
    }
}

/// Union of all columns plus the partition column (always text).
pub fn curated_schema(dataset: &Dataset, partition_column: &str) -> Schema {
    let mut columns = dataset.columns();
    columns.insert(partition_column);

    let fields: Vec<Field> = columns
        .into_iter()
        .map(|name| {
            let data_type = if name == partition_column {
                DataType::Utf8
            } else {
                column_type(dataset, name)
            };
            Field::new(name, data_type, true)
        })
        .collect();
    Schema::new(fields)
}

/// A record shaped for `schema`: text columns get the text form of every value,
/// the partition column always holds the record's partition key.
fn staged_record(record: &Record, schema: &Schema, partition_column: &str) -> Record {
    let row: Record = schema
        .fields()
        .iter()
        .filter(|f| f.name() != partition_column)
        .filter_map(|f| {
            let value = record.get(f.name()).filter(|v| !v.is_null())?;
            let value = match f.data_type() {
                DataType::Utf8 => Value::from(value.to_text()),
                _ => value.clone(),
            };
            Some((f.name().clone(), value))
        })
        .collect();
    row.with(partition_column, partition_key_of(record, partition_column))
}

fn partition_key_of(record: &Record, partition_column: &str) -> String {
    record
        .get(partition_column)
        .and_then(|v| v.to_text())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| DEFAULT_PARTITION.to_string())
}

/// Distinct partition values present in `dataset`, validated as directory names.
pub fn partition_values(
    dataset: &Dataset,
    partition_column: &str,
) -> Result<BTreeSet<String>, DomainError> {
    dataset
        .iter()
        .map(|record| {
            let key = partition_key_of(record, partition_column);
            check_partition_key(&key).map(|_| key)
        })
        .collect()
}

fn check_partition_key(key: &str) -> Result<(), DomainError> {
    if key == "." || key == ".." || key.contains('/') || key.contains('\\') {
        return Err(DomainError::UnsafePartitionKey(key.to_string()));
    }
    Ok(())
}

/// Moves each freshly written `<column>=<key>` directory from `staging_dir`
/// over its counterpart in `table_dir`.
fn swap_partitions(
    staging_dir: &Path,
    table_dir: &Path,
    partition_column: &str,
    keys: &BTreeSet<String>,
) -> Result<(), InfrastructureError> {
    for key in keys {
        let name = format!("{}={}", partition_column, key);
        let fresh = staging_dir.join(&name);
        if !fresh.is_dir() {
            warn!(partition = %key, "No files staged for partition");
            continue;
        }
        let live = table_dir.join(&name);
        if remove_dir_if_exists(&live)? {
            debug!(partition = %key, "Replaced existing partition");
        }
        fs::rename(&fresh, &live)?;
    }
    Ok(())
}

#[async_trait]
impl CuratedSink for ParquetSink {
    #[instrument(skip(self, dataset), fields(rows = dataset.len()))]
    async fn write_partitioned(
        &self,
        logical_path: &str,
        dataset: &Dataset,
        partition_column: &str,
    ) -> Result<WriteSummary, CuratorError> {
        if dataset.is_empty() {
            debug!("Nothing to write");
            return Ok(WriteSummary::default());
        }

        let table_dir = self.table_dir(logical_path)?;
        let partitions = partition_values(dataset, partition_column)?;

        // Stage next to the live partitions so the final swap is a rename
        fs::create_dir_all(&table_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&table_dir)?;

        self.stage_and_write(staging.path(), dataset, partition_column)
            .await?;
        swap_partitions(staging.path(), &table_dir, partition_column, &partitions)?;

        info!(
            path = ?table_dir,
            partitions = partitions.len(),
            "Curated Parquet written"
        );

        Ok(WriteSummary {
            rows_written: dataset.len(),
            partitions: partitions.into_iter().collect(),
        })
    }
}
