// curator-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: contracts with the external collaborators (raw storage, curated sink, catalog).
pub mod ports;

// 2. Domain: records, expectations, pseudonymization, classification, transforms.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure: local adapters (NDJSON, DataFusion/Parquet, file catalog), config, fs.
pub mod infrastructure;

// 4. Application: the transform pipeline and the validation use case.
pub mod application;

pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::CuratorError;
