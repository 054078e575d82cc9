// curator-core/src/domain/quality/classifier.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::dataset::{Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityScore {
    Pass,
    Warn,
    Fail,
}

impl QualityScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<QualityScore> for Value {
    fn from(score: QualityScore) -> Self {
        Value::String(score.as_str().to_string())
    }
}

const HEALTHY_BATTERY: f64 = 50.0;
const LOW_BATTERY: f64 = 20.0;
const REQUIRED_MEASUREMENTS: [&str; 3] = ["temperature_c", "humidity_pct", "aqi"];

/// Per-reading quality, first matching branch wins:
/// PASS for a healthy battery with all measurements present, WARN for a
/// battery above the low mark, FAIL otherwise (including a null battery).
pub fn classify(record: &Record) -> QualityScore {
    let battery = record.number("battery_level");
    let complete = REQUIRED_MEASUREMENTS.iter().all(|f| !record.is_null(f));

    match battery {
        Some(level) if level >= HEALTHY_BATTERY && complete => QualityScore::Pass,
        Some(level) if level >= LOW_BATTERY => QualityScore::Warn,
        _ => QualityScore::Fail,
    }
}
