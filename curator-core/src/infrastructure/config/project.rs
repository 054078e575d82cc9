// curator-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["curator_project_conf.yaml", "curator.yaml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Locate the project file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Parse YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Environment overrides (layering), e.g. CURATOR_DATABASE_NAME=datalake_prod curator run
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 4. Validate the merged result
    config.validate().map_err(|e| {
        InfrastructureError::ConfigError(format!("Invalid configuration in {:?}: {}", config_path, e))
    })?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("CURATOR_DATALAKE_ROOT") {
        info!(old = ?config.datalake_root, new = ?val, "Overriding datalake root via ENV");
        config.datalake_root = val;
    }
    if let Some(val) = lookup("CURATOR_ENVIRONMENT") {
        info!(old = ?config.environment, new = ?val, "Overriding environment via ENV");
        config.environment = val;
    }
    if let Some(val) = lookup("CURATOR_DATABASE_NAME") {
        info!(old = ?config.database_name, new = ?val, "Overriding database name via ENV");
        config.database_name = val;
    }
    if let Some(val) = lookup("CURATOR_KMS_KEY_ARN") {
        info!("Overriding KMS key via ENV");
        config.kms_key_arn = Some(val);
    }
    if let Some(val) = lookup("CURATOR_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
}
