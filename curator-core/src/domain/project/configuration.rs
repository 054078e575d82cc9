// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Deployment settings injected into the pipeline at construction time.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_environment")]
    #[validate(length(min = 1, message = "Environment cannot be empty"))]
    pub environment: String,

    /// Root of the data lake (the bucket). Holds `raw/`, `curated/` and `_catalog/`.
    #[serde(rename = "datalake-root", default = "default_datalake_root")]
    #[validate(length(min = 1, message = "Datalake root cannot be empty"))]
    pub datalake_root: String,

    #[serde(rename = "database-name")]
    #[validate(length(min = 1, message = "Database name cannot be empty"))]
    pub database_name: String,

    /// Key used by the storage layer for encryption at rest.
    #[serde(rename = "kms-key-arn", default)]
    pub kms_key_arn: Option<String>,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,
}

impl ProjectConfig {
    pub fn datalake_dir(&self, project_dir: &Path) -> PathBuf {
        resolve(project_dir, &self.datalake_root)
    }

    pub fn target_dir(&self, project_dir: &Path) -> PathBuf {
        resolve(project_dir, &self.target_path)
    }
}

fn resolve(project_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        project_dir.join(p)
    }
}

fn default_environment() -> String {
    "dev".to_string()
}
fn default_datalake_root() -> String {
    "datalake".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
