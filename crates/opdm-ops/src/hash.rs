use opdm_core::errors::{ErrorInfo, OpdmError};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::operator::OneParticleOperator;

fn hash_json<T: Serialize>(value: &T) -> Result<String, OpdmError> {
    let json = serde_json::to_vec(value)
        .map_err(|err| OpdmError::Serde(ErrorInfo::new("serialize", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(json);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Computes the canonical content hash of an operator.
pub fn operator_hash(op: &OneParticleOperator) -> Result<String, OpdmError> {
    hash_json(&op.snapshot()?)
}
