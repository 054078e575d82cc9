// curator-core/src/domain/quality/expectation.rs

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::domain::dataset::{Dataset, Record, ValueKind};

/// Records per partition-local tally. Any value gives the same counts.
const TALLY_CHUNK: usize = 4096;

/// A named, parameterized data-quality rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Expectation {
    NotNull { column: String },
    Between { column: String, min: f64, max: f64 },
    RowCountGreaterThan { value: u64 },
    OfType { column: String, kind: ValueKind },
}

impl Expectation {
    pub fn not_null(column: impl Into<String>) -> Self {
        Self::NotNull {
            column: column.into(),
        }
    }

    pub fn between(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self::Between {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn row_count_greater_than(value: u64) -> Self {
        Self::RowCountGreaterThan { value }
    }

    pub fn of_type(column: impl Into<String>, kind: ValueKind) -> Self {
        Self::OfType {
            column: column.into(),
            kind,
        }
    }

    pub fn expectation_type(&self) -> &'static str {
        match self {
            Self::NotNull { .. } => "expect_column_values_to_not_be_null",
            Self::Between { .. } => "expect_column_values_to_be_between",
            Self::RowCountGreaterThan { .. } => "expect_table_row_count_to_be_greater_than",
            Self::OfType { .. } => "expect_column_values_to_be_of_type",
        }
    }

    /// Evaluates the rule. Total for any dataset: a column missing from every
    /// record makes every row fail, it is never an engine error.
    pub fn evaluate(&self, dataset: &Dataset) -> ExpectationResult {
        match self {
            Self::NotNull { column } => {
                let tally = count_failing(dataset, column, |r| r.is_null(column));
                ExpectationResult::new(
                    self.expectation_type(),
                    tally.failing == 0,
                    [
                        ("column", json!(column)),
                        ("null_count", json!(tally.failing)),
                        ("total_count", json!(tally.total)),
                    ],
                )
            }
            Self::Between { column, min, max } => {
                let tally = count_failing(dataset, column, |r| {
                    r.number(column).is_some_and(|v| v < *min || v > *max)
                });
                ExpectationResult::new(
                    self.expectation_type(),
                    tally.failing == 0,
                    [
                        ("column", json!(column)),
                        ("min", json!(min)),
                        ("max", json!(max)),
                        ("out_of_range_count", json!(tally.failing)),
                        ("total_count", json!(tally.total)),
                    ],
                )
            }
            Self::RowCountGreaterThan { value } => {
                let row_count = dataset.len() as u64;
                ExpectationResult::new(
                    self.expectation_type(),
                    row_count > *value,
                    [
                        ("row_count", json!(row_count)),
                        ("min_expected", json!(value)),
                    ],
                )
            }
            Self::OfType { column, kind } => {
                let tally = count_failing(dataset, column, |r| {
                    r.get(column)
                        .is_some_and(|v| !v.is_null() && v.kind() != *kind)
                });
                ExpectationResult::new(
                    self.expectation_type(),
                    tally.failing == 0,
                    [
                        ("column", json!(column)),
                        ("expected_type", json!(kind)),
                        ("unexpected_count", json!(tally.failing)),
                        ("total_count", json!(tally.total)),
                    ],
                )
            }
        }
    }
}

/// Outcome of one expectation. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationResult {
    expectation_type: String,
    success: bool,
    details: BTreeMap<String, serde_json::Value>,
}

impl ExpectationResult {
    fn new<const N: usize>(
        expectation_type: &str,
        success: bool,
        details: [(&str, serde_json::Value); N],
    ) -> Self {
        Self {
            expectation_type: expectation_type.to_string(),
            success,
            details: details
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    pub fn expectation_type(&self) -> &str {
        &self.expectation_type
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn details(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.details
    }

    /// Reads an integer diagnostic such as `null_count` or `row_count`.
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.details.get(name).and_then(serde_json::Value::as_u64)
    }

    pub fn column(&self) -> Option<&str> {
        self.details.get("column").and_then(serde_json::Value::as_str)
    }
}

/// Partial count for one slice of a dataset. `merge` is associative and
/// commutative, so slices can be counted anywhere and summed centrally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub failing: u64,
    pub total: u64,
}

impl Tally {
    pub fn of<F>(records: &[Record], is_failing: F) -> Self
    where
        F: Fn(&Record) -> bool,
    {
        Self {
            failing: records.iter().filter(|r| is_failing(r)).count() as u64,
            total: records.len() as u64,
        }
    }

    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            failing: self.failing + other.failing,
            total: self.total + other.total,
        }
    }
}

fn count_failing<F>(dataset: &Dataset, column: &str, is_failing: F) -> Tally
where
    F: Fn(&Record) -> bool,
{
    if !dataset.has_column(column) {
        let total = dataset.len() as u64;
        return Tally {
            failing: total,
            total,
        };
    }
    tally_in_chunks(dataset, TALLY_CHUNK, is_failing)
}

fn tally_in_chunks<F>(dataset: &Dataset, chunk_size: usize, is_failing: F) -> Tally
where
    F: Fn(&Record) -> bool,
{
    dataset
        .chunks(chunk_size)
        .map(|chunk| Tally::of(chunk, &is_failing))
        .fold(Tally::default(), Tally::merge)
}
