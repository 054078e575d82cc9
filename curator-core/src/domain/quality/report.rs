// curator-core/src/domain/quality/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::dataset::Dataset;
use crate::domain::quality::expectation::{Expectation, ExpectationResult};

/// Pass/fail summary of every expectation evaluated on one dataset.
///
/// Counters and `success` are derived from `results` in [`ValidationReport::from_results`];
/// there is no other way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    dataset: String,
    expectations_evaluated: usize,
    expectations_passed: usize,
    expectations_failed: usize,
    success: bool,
    results: Vec<ExpectationResult>,
}

impl ValidationReport {
    pub fn from_results(dataset: impl Into<String>, results: Vec<ExpectationResult>) -> Self {
        let passed = results.iter().filter(|r| r.success()).count();
        let failed = results.len() - passed;
        Self {
            dataset: dataset.into(),
            expectations_evaluated: results.len(),
            expectations_passed: passed,
            expectations_failed: failed,
            success: failed == 0,
            results,
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn expectations_evaluated(&self) -> usize {
        self.expectations_evaluated
    }

    pub fn expectations_passed(&self) -> usize {
        self.expectations_passed
    }

    pub fn expectations_failed(&self) -> usize {
        self.expectations_failed
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn results(&self) -> &[ExpectationResult] {
        &self.results
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExpectationResult> {
        self.results.iter().filter(|r| !r.success())
    }
}

/// Accumulates expectation results for one dataset, in the order rules are added.
///
/// `validate` consumes the builder; a second dataset needs a new `Validator`.
pub struct Validator<'a> {
    dataset: &'a Dataset,
    name: String,
    results: Vec<ExpectationResult>,
}

impl<'a> Validator<'a> {
    pub fn new(dataset: &'a Dataset, name: impl Into<String>) -> Self {
        Self {
            dataset,
            name: name.into(),
            results: Vec::new(),
        }
    }

    pub fn expect(mut self, rule: &Expectation) -> Self {
        self.results.push(rule.evaluate(self.dataset));
        self
    }

    pub fn validate(self) -> ValidationReport {
        ValidationReport::from_results(self.name, self.results)
    }
}

/// Evaluates an ordered rule list against one dataset.
pub fn validate_dataset(dataset: &Dataset, name: &str, rules: &[Expectation]) -> ValidationReport {
    rules
        .iter()
        .fold(Validator::new(dataset, name), |v, rule| v.expect(rule))
        .validate()
}

/// A report stamped with the time it was produced. The stamp stays outside
/// the report so equal inputs give byte-identical reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub generated_at: DateTime<Utc>,
    pub report: ValidationReport,
}

impl ValidationRecord {
    pub fn now(report: ValidationReport) -> Self {
        Self {
            generated_at: Utc::now(),
            report,
        }
    }
}
