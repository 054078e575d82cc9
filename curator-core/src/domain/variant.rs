// curator-core/src/domain/variant.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::dataset::{Dataset, Record};
use crate::domain::error::DomainError;
use crate::domain::quality::Expectation;
use crate::domain::transform::{curate_sensor_reading, curate_weather};

/// The two datasets the pipeline knows how to curate. They share the run
/// skeleton and differ in paths, rules and column transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetVariant {
    Weather,
    SensorReadings,
}

impl DatasetVariant {
    pub const ALL: [DatasetVariant; 2] = [DatasetVariant::Weather, DatasetVariant::SensorReadings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::SensorReadings => "sensor-readings",
        }
    }

    /// Name carried by the validation report.
    pub fn report_name(&self) -> &'static str {
        match self {
            Self::Weather => "raw_weather",
            Self::SensorReadings => "raw_iot_sensors",
        }
    }

    pub fn raw_path(&self) -> &'static str {
        match self {
            Self::Weather => "raw/weather/",
            Self::SensorReadings => "raw/iot-sensors/",
        }
    }

    pub fn curated_path(&self) -> &'static str {
        match self {
            Self::Weather => "curated/weather/",
            Self::SensorReadings => "curated/sensor-readings/",
        }
    }

    /// Catalog table refreshed after each write.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Weather => "curated_weather",
            Self::SensorReadings => "curated_sensor_readings",
        }
    }

    pub fn rules(&self) -> Vec<Expectation> {
        match self {
            Self::Weather => vec![
                Expectation::not_null("city"),
                Expectation::not_null("timestamp"),
                Expectation::not_null("temperature_c"),
                Expectation::between("temperature_c", -90.0, 60.0),
                Expectation::between("humidity_pct", 0.0, 100.0),
                Expectation::row_count_greater_than(0),
            ],
            Self::SensorReadings => vec![
                Expectation::not_null("sensor_id"),
                Expectation::not_null("city"),
                Expectation::not_null("timestamp"),
                Expectation::not_null("temperature_c"),
                Expectation::between("temperature_c", -50.0, 60.0),
                Expectation::between("humidity_pct", 0.0, 100.0),
                Expectation::between("aqi", 0.0, 500.0),
                Expectation::between("battery_level", 0.0, 100.0),
                Expectation::row_count_greater_than(0),
            ],
        }
    }

    pub fn curate_record(&self, record: Record) -> Record {
        match self {
            Self::Weather => curate_weather(record),
            Self::SensorReadings => curate_sensor_reading(record),
        }
    }

    pub fn curate(&self, dataset: Dataset) -> Dataset {
        dataset.map_records(|r| self.curate_record(r))
    }
}

impl FromStr for DatasetVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "weather" => Ok(Self::Weather),
            "sensor-readings" | "iot-sensors" | "sensors" => Ok(Self::SensorReadings),
            _ => Err(DomainError::UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for DatasetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
