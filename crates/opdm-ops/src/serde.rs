use opdm_core::errors::{ErrorInfo, OpdmError};

use crate::operator::OneParticleOperator;
use crate::snapshot::OperatorSnapshot;

fn map_err(err: serde_json::Error, code: &str) -> OpdmError {
    OpdmError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serialises an operator to pretty JSON.
pub fn operator_to_json(op: &OneParticleOperator) -> Result<String, OpdmError> {
    serde_json::to_string_pretty(&op.snapshot()?)
        .map_err(|err| map_err(err, "operator-serialize"))
}

/// Restores an operator from JSON.
pub fn operator_from_json(json: &str) -> Result<OneParticleOperator, OpdmError> {
    let snapshot: OperatorSnapshot =
        serde_json::from_str(json).map_err(|err| map_err(err, "operator-deserialize"))?;
    OneParticleOperator::from_snapshot(snapshot)
}
