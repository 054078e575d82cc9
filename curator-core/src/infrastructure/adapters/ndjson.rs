// curator-core/src/infrastructure/adapters/ndjson.rs

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::dataset::{Dataset, Record};
use crate::domain::error::DomainError;
use crate::error::CuratorError;
use crate::ports::source::RawSource;

const RAW_EXTENSIONS: [&str; 3] = ["json", "jsonl", "ndjson"];

/// Raw storage on the local filesystem: newline-delimited JSON files below
/// `<root>/<logical_path>`, searched recursively in path order.
pub struct LocalRawSource {
    root: PathBuf,
}

impl LocalRawSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl RawSource for LocalRawSource {
    async fn read_dataset(&self, logical_path: &str) -> Result<Dataset, CuratorError> {
        let dir = self.root.join(logical_path);
        let records = tokio::task::spawn_blocking(move || read_ndjson_tree(&dir))
            .await
            .map_err(|e| CuratorError::InternalError(format!("Raw reader task failed: {}", e)))?
            .map_err(CuratorError::Domain)?;
        Ok(Dataset::new(records))
    }
}

fn source_error(path: &Path, reason: impl Into<String>) -> DomainError {
    DomainError::SourceRead {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

fn read_ndjson_tree(dir: &Path) -> Result<Vec<Record>, DomainError> {
    if !dir.is_dir() {
        return Err(source_error(dir, "path does not exist or is not a directory"));
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| source_error(dir, e.to_string()))?;
        let path = entry.path();
        let is_raw_file = entry.file_type().is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| RAW_EXTENSIONS.contains(&e));
        if !is_raw_file {
            continue;
        }

        let before = records.len();
        read_ndjson_file(path, &mut records)?;
        debug!(file = ?path, records = records.len() - before, "Read raw file");
    }
    Ok(records)
}

fn read_ndjson_file(path: &Path, out: &mut Vec<Record>) -> Result<(), DomainError> {
    let content = fs::read_to_string(path).map_err(|e| source_error(path, e.to_string()))?;
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(line)
            .map_err(|e| source_error(path, format!("line {}: {}", idx + 1, e)))?;
        out.push(record);
    }
    Ok(())
}
