pub mod dataset;
pub mod error;
pub mod governance;
pub mod project;
pub mod quality;
pub mod transform;
pub mod variant;

// Handy re-exports to simplify imports elsewhere
pub use dataset::{Dataset, Record, Value};
pub use error::DomainError;
pub use variant::DatasetVariant;
