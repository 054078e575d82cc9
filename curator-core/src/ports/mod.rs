// curator-core/src/ports/mod.rs

pub mod catalog;
pub mod sink;
pub mod source;

pub use catalog::{CatalogClient, CatalogTable};
pub use sink::{CuratedSink, WriteSummary};
pub use source::RawSource;
