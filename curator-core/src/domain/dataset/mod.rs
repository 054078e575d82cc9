// curator-core/src/domain/dataset/mod.rs

pub mod record;

pub use record::{Record, Value, ValueKind};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Ordered collection of records sharing an implicit schema
/// (the union of the fields present).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Union of field names across all records.
    pub fn columns(&self) -> BTreeSet<&str> {
        self.records.iter().flat_map(Record::field_names).collect()
    }

    /// A column exists when at least one record carries the field (even as null).
    pub fn has_column(&self, column: &str) -> bool {
        self.records.iter().any(|r| r.contains(column))
    }

    /// Fixed-size slices for partition-local reductions. A zero size is treated as 1.
    pub fn chunks(&self, size: usize) -> std::slice::Chunks<'_, Record> {
        self.records.chunks(size.max(1))
    }

    pub fn map_records<F>(self, f: F) -> Dataset
    where
        F: Fn(Record) -> Record,
    {
        self.records.into_iter().map(f).collect()
    }

    /// Groups records by the text form of `column`. Null values group under `None`.
    pub fn group_by(&self, column: &str) -> BTreeMap<Option<String>, Vec<&Record>> {
        let mut groups: BTreeMap<Option<String>, Vec<&Record>> = BTreeMap::new();
        for record in &self.records {
            let key = record.get(column).and_then(Value::to_text);
            groups.entry(key).or_default().push(record);
        }
        groups
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
