// curator-core/src/domain/transform.rs

use crate::domain::dataset::{Record, Value};
use crate::domain::governance::pseudonymize_value;
use crate::domain::quality::classify;

pub const PARTITION_COLUMN: &str = "date";

/// Hive's name for the partition of records without a usable key.
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

const PARTITION_KEY_LEN: usize = 10;

/// Date part of an ISO-8601 timestamp: its first 10 characters.
/// Shorter strings are kept whole; null or empty timestamps land in the default partition.
pub fn partition_key(timestamp: Option<&Value>) -> String {
    match timestamp.and_then(Value::to_text) {
        Some(ts) if !ts.is_empty() => ts.chars().take(PARTITION_KEY_LEN).collect(),
        _ => DEFAULT_PARTITION.to_string(),
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_to(celsius * 9.0 / 5.0 + 32.0, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn with_partition_key(record: Record) -> Record {
    let key = partition_key(record.get("timestamp"));
    record.with(PARTITION_COLUMN, key)
}

/// Weather hour: adds `temperature_f` and the partition column.
pub fn curate_weather(record: Record) -> Record {
    let fahrenheit = record.number("temperature_c").map(celsius_to_fahrenheit);
    with_partition_key(record.with("temperature_f", fahrenheit))
}

/// Sensor reading: swaps `sensor_id` for `sensor_id_hash`, adds
/// `quality_score` and the partition column. The raw identifier is removed.
pub fn curate_sensor_reading(record: Record) -> Record {
    let hashed = record
        .get("sensor_id")
        .map(pseudonymize_value)
        .unwrap_or(Value::Null);
    let score = classify(&record);

    with_partition_key(
        record
            .with("sensor_id_hash", hashed)
            .without("sensor_id")
            .with("quality_score", score),
    )
}
