// curator-core/src/domain/governance/mod.rs

pub mod pseudonymize;

// Re-exports
pub use pseudonymize::{pseudonymize, pseudonymize_value};
