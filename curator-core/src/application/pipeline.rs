// curator-core/src/application/pipeline.rs

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::application::validation::validate_variant;
use crate::domain::project::ProjectConfig;
use crate::domain::quality::{ValidationRecord, ValidationReport};
use crate::domain::transform::PARTITION_COLUMN;
use crate::domain::variant::DatasetVariant;
use crate::error::CuratorError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::catalog::{CatalogClient, CatalogTable};
use crate::ports::sink::{CuratedSink, WriteSummary};
use crate::ports::source::RawSource;

/// Run-wide settings, taken from the project configuration at construction.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub environment: String,
    pub database_name: String,
    pub kms_key_arn: Option<String>,
    /// Where validation records and `run_results.json` go.
    pub target_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &ProjectConfig, project_dir: &Path) -> Self {
        Self {
            environment: config.environment.clone(),
            database_name: config.database_name.clone(),
            kms_key_arn: config.kms_key_arn.clone(),
            target_dir: config.target_dir(project_dir),
        }
    }
}

/// Pass/fail counters of one validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCounts {
    pub evaluated: usize,
    pub passed: usize,
    pub failed: usize,
    pub success: bool,
}

impl From<&ValidationReport> for ValidationCounts {
    fn from(report: &ValidationReport) -> Self {
        Self {
            evaluated: report.expectations_evaluated(),
            passed: report.expectations_passed(),
            failed: report.expectations_failed(),
            success: report.success(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VariantOutcome {
    /// Raw input missing or unreadable; nothing was validated or written.
    SourceReadFailed { error: String },
    /// Raw input was readable but held no records; nothing was written.
    SkippedEmpty,
    /// Written and registered. `validation.success == false` means "ran with quality warnings".
    Completed {
        validation: ValidationCounts,
        write: WriteSummary,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRun {
    pub variant: DatasetVariant,
    #[serde(flatten)]
    pub outcome: VariantOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub environment: String,
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub variants: Vec<VariantRun>,
}

impl RunSummary {
    /// Variants that were written despite failed expectations.
    pub fn quality_warnings(&self) -> impl Iterator<Item = &VariantRun> {
        self.variants.iter().filter(|run| {
            matches!(
                run.outcome,
                VariantOutcome::Completed { validation, .. } if !validation.success
            )
        })
    }

    pub fn source_failures(&self) -> impl Iterator<Item = &VariantRun> {
        self.variants
            .iter()
            .filter(|run| matches!(run.outcome, VariantOutcome::SourceReadFailed { .. }))
    }
}

/// READ → VALIDATE → TRANSFORM → PARTITION_WRITE → CATALOG_REGISTER, once per variant.
///
/// Validation never gates the write. Raw read failures and empty inputs end the
/// variant early without failing the run; a catalog failure fails the run.
pub struct TransformPipeline {
    source: Arc<dyn RawSource>,
    sink: Arc<dyn CuratedSink>,
    catalog: Arc<dyn CatalogClient>,
    settings: PipelineSettings,
}

impl TransformPipeline {
    pub fn new(
        source: Arc<dyn RawSource>,
        sink: Arc<dyn CuratedSink>,
        catalog: Arc<dyn CatalogClient>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            sink,
            catalog,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the given variants concurrently and persists `run_results.json`.
    pub async fn run(&self, variants: &[DatasetVariant]) -> Result<RunSummary, CuratorError> {
        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            environment = %self.settings.environment,
            database = %self.settings.database_name,
            encrypted = self.settings.kms_key_arn.is_some(),
            variants = variants.len(),
            "Starting curation run"
        );

        let results = join_all(variants.iter().map(|&v| self.run_variant(v))).await;

        let mut runs = Vec::with_capacity(results.len());
        for result in results {
            runs.push(result?);
        }

        let summary = RunSummary {
            environment: self.settings.environment.clone(),
            database: self.settings.database_name.clone(),
            started_at,
            duration_secs: start.elapsed().as_secs_f64(),
            variants: runs,
        };
        save_json(&self.settings.target_dir.join("run_results.json"), &summary)?;

        info!(
            duration_secs = summary.duration_secs,
            quality_warnings = summary.quality_warnings().count(),
            source_failures = summary.source_failures().count(),
            "Curation run finished"
        );
        Ok(summary)
    }

    #[instrument(skip(self, variant), fields(variant = %variant))]
    pub async fn run_variant(&self, variant: DatasetVariant) -> Result<VariantRun, CuratorError> {
        // 1. READ (failures end this variant only)
        let raw = match self.source.read_dataset(variant.raw_path()).await {
            Ok(ds) => ds,
            Err(e) => {
                error!(error = %e, path = variant.raw_path(), "Raw read failed, skipping dataset");
                return Ok(VariantRun {
                    variant,
                    outcome: VariantOutcome::SourceReadFailed {
                        error: e.to_string(),
                    },
                });
            }
        };

        if raw.is_empty() {
            warn!(path = variant.raw_path(), "No raw records, nothing to write");
            return Ok(VariantRun {
                variant,
                outcome: VariantOutcome::SkippedEmpty,
            });
        }
        info!(rows = raw.len(), "Raw dataset loaded");

        // 2. VALIDATE (logged and persisted, never blocks)
        let report = validate_variant(variant, &raw);
        let validation = ValidationCounts::from(&report);
        let report_path = self
            .settings
            .target_dir
            .join("validation")
            .join(format!("{}.json", variant.report_name()));
        if let Err(e) = save_json(&report_path, &ValidationRecord::now(report)) {
            warn!(error = %e, path = ?report_path, "Could not persist validation record");
        }

        // 3. TRANSFORM
        let curated = variant.curate(raw);

        // 4. PARTITION_WRITE
        let write = self
            .sink
            .write_partitioned(variant.curated_path(), &curated, PARTITION_COLUMN)
            .await?;

        // 5. CATALOG_REGISTER
        let table = CatalogTable {
            database: self.settings.database_name.clone(),
            name: variant.table_name().to_string(),
            location: variant.curated_path().to_string(),
            partition_column: PARTITION_COLUMN.to_string(),
        };
        self.catalog.refresh_partitions(&table).await?;

        info!(
            rows = write.rows_written,
            partitions = write.partitions.len(),
            table = %table.qualified_name(),
            "Dataset curated"
        );

        Ok(VariantRun {
            variant,
            outcome: VariantOutcome::Completed { validation, write },
        })
    }
}

fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), CuratorError> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| CuratorError::InternalError(format!("Serialization: {}", e)))?;
    atomic_write(path, content)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Dataset, Record};
    use crate::domain::error::DomainError;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MemorySource {
        datasets: HashMap<String, Dataset>,
    }

    impl MemorySource {
        fn with(mut self, path: &str, records: Vec<Record>) -> Self {
            self.datasets.insert(path.to_string(), Dataset::new(records));
            self
        }
    }

    #[async_trait]
    impl RawSource for MemorySource {
        async fn read_dataset(&self, logical_path: &str) -> Result<Dataset, CuratorError> {
            self.datasets.get(logical_path).cloned().ok_or_else(|| {
                DomainError::SourceRead {
                    path: logical_path.to_string(),
                    reason: "no such prefix".into(),
                }
                .into()
            })
        }
    }

    #[derive(Default, Clone)]
    struct RecordingSink {
        writes: Arc<Mutex<Vec<(String, Dataset)>>>,
    }

    #[async_trait]
    impl CuratedSink for RecordingSink {
        async fn write_partitioned(
            &self,
            logical_path: &str,
            dataset: &Dataset,
            partition_column: &str,
        ) -> Result<WriteSummary, CuratorError> {
            self.writes
                .lock()
                .unwrap()
                .push((logical_path.to_string(), dataset.clone()));
            let mut partitions: Vec<String> = dataset
                .group_by(partition_column)
                .into_keys()
                .flatten()
                .collect();
            partitions.sort();
            Ok(WriteSummary {
                rows_written: dataset.len(),
                partitions,
            })
        }
    }

    #[derive(Default, Clone)]
    struct RecordingCatalog {
        refreshed: Arc<Mutex<Vec<CatalogTable>>>,
        fail: bool,
    }

    #[async_trait]
    impl CatalogClient for RecordingCatalog {
        async fn refresh_partitions(&self, table: &CatalogTable) -> Result<(), CuratorError> {
            if self.fail {
                return Err(DomainError::CatalogRegistration {
                    table: table.qualified_name(),
                    reason: "metastore unavailable".into(),
                }
                .into());
            }
            self.refreshed.lock().unwrap().push(table.clone());
            Ok(())
        }
    }

    fn austin_weather() -> Record {
        Record::new()
            .with("city", "Austin")
            .with("timestamp", "2024-01-01T12:00")
            .with("temperature_c", 20.0)
            .with("humidity_pct", 55.0)
            .with("wind_speed_kmh", 10.0)
    }

    fn sensor(id: &str, battery: f64) -> Record {
        Record::new()
            .with("sensor_id", id)
            .with("city", "Austin")
            .with("timestamp", "2024-01-01T12:00:00")
            .with("temperature_c", 21.0)
            .with("humidity_pct", 40.0)
            .with("aqi", 30.0)
            .with("battery_level", battery)
    }

    fn settings(target: &Path) -> PipelineSettings {
        PipelineSettings {
            environment: "dev".into(),
            database_name: "datalake_dev".into(),
            kms_key_arn: None,
            target_dir: target.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_weather() -> Result<()> {
        let tmp = tempdir()?;
        let sink = RecordingSink::default();
        let catalog = RecordingCatalog::default();
        let pipeline = TransformPipeline::new(
            Arc::new(MemorySource::default().with("raw/weather/", vec![austin_weather()])),
            Arc::new(sink.clone()),
            Arc::new(catalog.clone()),
            settings(tmp.path()),
        );

        let run = pipeline.run_variant(DatasetVariant::Weather).await?;

        match &run.outcome {
            VariantOutcome::Completed { validation, write } => {
                assert_eq!(validation.failed, 0);
                assert!(validation.success);
                assert_eq!(write.partitions, vec!["2024-01-01"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let writes = sink.writes.lock().unwrap();
        let (path, curated) = &writes[0];
        assert_eq!(path, "curated/weather/");
        let row = &curated.records()[0];
        assert_eq!(row.number("temperature_f"), Some(68.0));
        assert_eq!(row.text("date"), Some("2024-01-01"));

        let tables = catalog.refreshed.lock().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "curated_weather");
        assert_eq!(tables[0].database, "datalake_dev");

        assert!(tmp.path().join("validation/raw_weather.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_validation_failure_does_not_block_write() -> Result<()> {
        let tmp = tempdir()?;
        let sink = RecordingSink::default();
        let hot = austin_weather().with("temperature_c", 61.0);
        let pipeline = TransformPipeline::new(
            Arc::new(MemorySource::default().with("raw/weather/", vec![hot])),
            Arc::new(sink.clone()),
            Arc::new(RecordingCatalog::default()),
            settings(tmp.path()),
        );

        let summary = pipeline.run(&[DatasetVariant::Weather]).await?;

        assert_eq!(summary.quality_warnings().count(), 1);
        assert_eq!(sink.writes.lock().unwrap().len(), 1);

        let persisted: ValidationRecord = serde_json::from_str(&std::fs::read_to_string(
            tmp.path().join("validation/raw_weather.json"),
        )?)?;
        assert!(!persisted.report.success());
        assert_eq!(persisted.report.expectations_failed(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_sensor_ids_never_reach_the_sink() -> Result<()> {
        let tmp = tempdir()?;
        let sink = RecordingSink::default();
        let pipeline = TransformPipeline::new(
            Arc::new(MemorySource::default().with(
                "raw/iot-sensors/",
                vec![sensor("sensor-1", 80.0), sensor("sensor-2", 30.0)],
            )),
            Arc::new(sink.clone()),
            Arc::new(RecordingCatalog::default()),
            settings(tmp.path()),
        );

        pipeline.run_variant(DatasetVariant::SensorReadings).await?;

        let writes = sink.writes.lock().unwrap();
        let (path, curated) = &writes[0];
        assert_eq!(path, "curated/sensor-readings/");
        assert!(curated.iter().all(|r| !r.contains("sensor_id")));
        let scores: Vec<&str> = curated.iter().filter_map(|r| r.text("quality_score")).collect();
        assert_eq!(scores, vec!["PASS", "WARN"]);
        assert!(curated.iter().all(|r| r.text("sensor_id_hash").is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_and_unreadable_inputs_do_not_fail_run() -> Result<()> {
        let tmp = tempdir()?;
        let sink = RecordingSink::default();
        let catalog = RecordingCatalog::default();
        let pipeline = TransformPipeline::new(
            Arc::new(MemorySource::default().with("raw/weather/", vec![])),
            Arc::new(sink.clone()),
            Arc::new(catalog.clone()),
            settings(tmp.path()),
        );

        let summary = pipeline.run(&DatasetVariant::ALL).await?;

        assert_eq!(summary.variants[0].outcome, VariantOutcome::SkippedEmpty);
        assert!(matches!(
            summary.variants[1].outcome,
            VariantOutcome::SourceReadFailed { .. }
        ));
        assert_eq!(summary.source_failures().count(), 1);
        assert!(sink.writes.lock().unwrap().is_empty());
        assert!(catalog.refreshed.lock().unwrap().is_empty());
        assert!(tmp.path().join("run_results.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_failure_fails_run() {
        let tmp = tempdir().unwrap();
        let pipeline = TransformPipeline::new(
            Arc::new(MemorySource::default().with("raw/weather/", vec![austin_weather()])),
            Arc::new(RecordingSink::default()),
            Arc::new(RecordingCatalog {
                fail: true,
                ..Default::default()
            }),
            settings(tmp.path()),
        );

        let err = pipeline.run(&[DatasetVariant::Weather]).await.unwrap_err();
        assert!(matches!(
            err,
            CuratorError::Domain(DomainError::CatalogRegistration { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_run_matches_sequential() -> Result<()> {
        let source = Arc::new(
            MemorySource::default()
                .with("raw/weather/", vec![austin_weather()])
                .with("raw/iot-sensors/", vec![sensor("s-1", 10.0)]),
        );
        let tmp = tempdir()?;
        let pipeline = TransformPipeline::new(
            source,
            Arc::new(RecordingSink::default()),
            Arc::new(RecordingCatalog::default()),
            settings(tmp.path()),
        );

        let concurrent = pipeline.run(&DatasetVariant::ALL).await?;
        let mut sequential = Vec::new();
        for v in DatasetVariant::ALL {
            sequential.push(pipeline.run_variant(v).await?);
        }

        assert_eq!(concurrent.variants, sequential);
        Ok(())
    }

    #[tokio::test]
    async fn test_unwritable_validation_record_does_not_abort_variant() -> Result<()> {
        let tmp = tempdir()?;
        // A regular file where the target directory should be
        let target = tmp.path().join("target");
        std::fs::write(&target, "not a directory")?;

        let sink = RecordingSink::default();
        let pipeline = TransformPipeline::new(
            Arc::new(MemorySource::default().with("raw/weather/", vec![austin_weather()])),
            Arc::new(sink.clone()),
            Arc::new(RecordingCatalog::default()),
            settings(&target),
        );

        let run = pipeline.run_variant(DatasetVariant::Weather).await?;

        assert!(matches!(run.outcome, VariantOutcome::Completed { .. }));
        assert_eq!(sink.writes.lock().unwrap().len(), 1);
        Ok(())
    }
}
