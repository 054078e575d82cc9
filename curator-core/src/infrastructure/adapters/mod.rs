// curator-core/src/infrastructure/adapters/mod.rs

pub mod catalog;
pub mod ndjson;
pub mod parquet;

pub use catalog::FileCatalog;
pub use ndjson::LocalRawSource;
pub use parquet::ParquetSink;
