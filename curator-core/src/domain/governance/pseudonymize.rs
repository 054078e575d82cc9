// curator-core/src/domain/governance/pseudonymize.rs

use sha2::{Digest, Sha256};

use crate::domain::dataset::Value;

/// Lowercase hex SHA-256 of the UTF-8 bytes. Null stays null.
///
/// No salt: the same identifier yields the same pseudonym in every process,
/// which is what lets independently produced identifiers line up downstream.
pub fn pseudonymize(value: Option<&str>) -> Option<String> {
    value.map(|v| hex::encode(Sha256::digest(v.as_bytes())))
}

/// Cell-level variant. Non-string scalars are hashed through their text form.
pub fn pseudonymize_value(value: &Value) -> Value {
    pseudonymize(value.to_text().as_deref()).into()
}
