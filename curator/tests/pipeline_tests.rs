use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use datafusion::arrow::array::Float64Array;
use datafusion::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const AUSTIN: &str = r#"{"city":"Austin","timestamp":"2024-01-01T12:00","temperature_c":20.0,"humidity_pct":55,"wind_speed_kmh":10}"#;

/// Throwaway project: `curator.yaml` plus a data lake under `lake/`.
struct CuratorTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl CuratorTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().join("project");
        fs::create_dir_all(&root)?;
        fs::write(
            root.join("curator.yaml"),
            "name: test_lake\nenvironment: dev\ndatabase-name: datalake_dev\ndatalake-root: lake\n",
        )?;
        Ok(Self { _tmp: tmp, root })
    }

    fn lake(&self) -> PathBuf {
        self.root.join("lake")
    }

    fn write_raw(&self, prefix: &str, file: &str, lines: &[&str]) -> Result<()> {
        let path = self.lake().join(prefix).join(file);
        fs::create_dir_all(path.parent().context("raw file has no parent")?)?;
        fs::write(path, lines.join("\n") + "\n")?;
        Ok(())
    }

    fn curator(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("curator"));
        cmd.current_dir(&self.root);
        cmd.env_remove("CURATOR_DATALAKE_ROOT");
        cmd.env_remove("CURATOR_TARGET_PATH");
        cmd
    }

    fn run_results(&self) -> Result<serde_json::Value> {
        let content = fs::read_to_string(self.root.join("target/run_results.json"))?;
        Ok(serde_json::from_str(&content)?)
    }
}

async fn read_curated(dir: &Path) -> Result<DataFrame> {
    let ctx = SessionContext::new();
    Ok(ctx
        .read_parquet(
            format!("{}/", dir.display()),
            ParquetReadOptions::default(),
        )
        .await?)
}

#[tokio::test]
async fn test_austin_weather_end_to_end() -> Result<()> {
    let env = CuratorTestEnv::new()?;
    env.write_raw("raw/weather/date=2024-01-01", "austin.json", &[AUSTIN])?;

    env.curator()
        .arg("run")
        .arg("--only")
        .arg("weather")
        .assert()
        .success()
        .stdout(predicate::str::contains("weather"))
        .stdout(predicate::str::contains("6/6 passed"));

    let table = env.lake().join("curated/weather");
    assert!(table.join("date=2024-01-01").is_dir());

    let batches = read_curated(&table)
        .await?
        .select_columns(&["temperature_f"])?
        .collect()
        .await?;
    let temps = batches[0]
        .column(0)
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("temperature_f is not Float64")?;
    assert_eq!(temps.len(), 1);
    assert_eq!(temps.value(0), 68.0);

    let results = env.run_results()?;
    assert_eq!(results["variants"][0]["status"], "completed");
    assert_eq!(results["variants"][0]["validation"]["failed"], 0);

    let report = fs::read_to_string(env.root.join("target/validation/raw_weather.json"))?;
    assert!(report.contains("\"success\": true"));

    assert!(
        env.lake()
            .join("_catalog/datalake_dev/curated_weather.json")
            .exists()
    );
    Ok(())
}

#[tokio::test]
async fn test_rerun_is_idempotent() -> Result<()> {
    let env = CuratorTestEnv::new()?;
    env.write_raw(
        "raw/weather/date=2024-01-01",
        "austin.json",
        &[AUSTIN, AUSTIN],
    )?;

    env.curator().args(["run", "--only", "weather"]).assert().success();
    env.curator().args(["run", "--only", "weather"]).assert().success();

    let table = env.lake().join("curated/weather");
    assert_eq!(read_curated(&table).await?.count().await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_sensor_ids_are_pseudonymized_on_disk() -> Result<()> {
    let env = CuratorTestEnv::new()?;
    env.write_raw(
        "raw/iot-sensors",
        "batch.json",
        &[
            r#"{"sensor_id":"sensor-austin-001","city":"Austin","timestamp":"2024-01-01T08:00:00","temperature_c":21.0,"humidity_pct":40,"aqi":30,"battery_level":90}"#,
            r#"{"sensor_id":"sensor-austin-002","city":"Austin","timestamp":"2024-01-02T08:00:00","temperature_c":22.0,"humidity_pct":41,"aqi":31,"battery_level":10}"#,
        ],
    )?;

    env.curator()
        .args(["run", "--only", "sensor-readings"])
        .assert()
        .success();

    let table = env.lake().join("curated/sensor-readings");
    assert!(table.join("date=2024-01-01").is_dir());
    assert!(table.join("date=2024-01-02").is_dir());

    let df = read_curated(&table).await?;
    let columns: Vec<String> = df
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert!(columns.contains(&"sensor_id_hash".to_string()));
    assert!(columns.contains(&"quality_score".to_string()));
    assert!(!columns.contains(&"sensor_id".to_string()));

    for entry in walkdir::WalkDir::new(&table) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let bytes = fs::read(entry.path())?;
            let needle = b"sensor-austin-001";
            assert!(!bytes.windows(needle.len()).any(|w| w == needle));
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_and_empty_inputs_do_not_fail_run() -> Result<()> {
    let env = CuratorTestEnv::new()?;
    env.write_raw("raw/weather", "empty.json", &[""])?;

    env.curator()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("empty, skipped"))
        .stdout(predicate::str::contains("read failed"));

    let results = env.run_results()?;
    assert_eq!(results["variants"][0]["status"], "skipped_empty");
    assert_eq!(results["variants"][1]["status"], "source_read_failed");
    assert!(!env.lake().join("curated").exists());
    Ok(())
}

#[tokio::test]
async fn test_validation_failure_still_writes() -> Result<()> {
    let env = CuratorTestEnv::new()?;
    let hot = AUSTIN.replace("20.0", "61.0");
    env.write_raw("raw/weather", "hot.json", &[&hot])?;

    env.curator()
        .args(["run", "--only", "weather"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quality warnings"));

    let table = env.lake().join("curated/weather");
    assert_eq!(read_curated(&table).await?.count().await?, 1);

    let results = env.run_results()?;
    assert_eq!(results["variants"][0]["validation"]["success"], false);
    assert_eq!(results["variants"][0]["validation"]["failed"], 1);
    Ok(())
}

#[test]
fn test_validate_check_fails_on_bad_data() -> Result<()> {
    let env = CuratorTestEnv::new()?;
    let hot = AUSTIN.replace("20.0", "61.0");
    env.write_raw("raw/weather", "hot.json", &[&hot])?;

    env.curator()
        .args(["validate", "--only", "weather"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expect_column_values_to_be_between"));

    env.curator()
        .args(["validate", "--only", "weather", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--check mode"));

    assert!(!env.lake().join("curated").exists());
    Ok(())
}

#[test]
fn test_missing_config_fails() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    Command::new(assert_cmd::cargo::cargo_bin!("curator"))
        .arg("run")
        .arg("--project-dir")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
    Ok(())
}
