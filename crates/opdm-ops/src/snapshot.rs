use nalgebra::DMatrix;
use opdm_core::errors::{ErrorInfo, OpdmError};
use opdm_core::{BlockLabel, MoSpaces, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::operator::{BlockOperator, OneParticleOperator};
use crate::params::OperatorOpts;

/// Schema written into every operator snapshot.
pub const OPERATOR_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serializable image of a single stored block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Label of the stored block.
    pub label: BlockLabel,
    /// Dense data, `None` for blocks flagged zero.
    pub matrix: Option<DMatrix<f64>>,
}

/// Serializable image of a one-particle operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSnapshot {
    /// Schema of the payload.
    pub schema_version: SchemaVersion,
    /// Orbital-space layout of the operator.
    pub mospaces: MoSpaces,
    /// Construction options.
    pub opts: OperatorOpts,
    /// Stored blocks in sorted label order.
    pub blocks: Vec<BlockEntry>,
}

fn ensure_finite(label: &BlockLabel, matrix: &DMatrix<f64>) -> Result<(), OpdmError> {
    match matrix.iter().position(|value| !value.is_finite()) {
        None => Ok(()),
        Some(index) => {
            let (row, col) = (index % matrix.nrows(), index / matrix.nrows());
            Err(OpdmError::Serde(
                ErrorInfo::new("non-finite-entry", "block holds a non-finite entry")
                    .with_context("label", label.to_string())
                    .with_context("entry", format!("({row}, {col})"))
                    .with_context("value", matrix[(row, col)].to_string()),
            ))
        }
    }
}

impl OneParticleOperator {
    /// Captures the operator as a serializable snapshot.
    ///
    /// JSON has no representation for `inf` or `NaN`, so blocks holding
    /// non-finite entries are rejected.
    pub fn snapshot(&self) -> Result<OperatorSnapshot, OpdmError> {
        let blocks = self
            .blocks()
            .into_iter()
            .map(|label| {
                let matrix = self.block(&label).ok().map(|t| t.matrix().clone());
                if let Some(matrix) = &matrix {
                    ensure_finite(&label, matrix)?;
                }
                Ok(BlockEntry { label, matrix })
            })
            .collect::<Result<Vec<_>, OpdmError>>()?;
        Ok(OperatorSnapshot {
            schema_version: OPERATOR_SCHEMA,
            mospaces: self.mospaces().clone(),
            opts: self.opts().clone(),
            blocks,
        })
    }

    /// Rebuilds an operator from a snapshot, re-validating every block.
    pub fn from_snapshot(snapshot: OperatorSnapshot) -> Result<Self, OpdmError> {
        if !OPERATOR_SCHEMA.reads(&snapshot.schema_version) {
            return Err(OpdmError::Serde(
                ErrorInfo::new("schema-version", "unsupported operator schema")
                    .with_context(
                        "found",
                        format!(
                            "{}.{}.{}",
                            snapshot.schema_version.major,
                            snapshot.schema_version.minor,
                            snapshot.schema_version.patch
                        ),
                    ),
            ));
        }
        let mut op = Self::new(&snapshot.mospaces, &snapshot.opts)?;
        let labels: Vec<BlockLabel> = snapshot.blocks.iter().map(|e| e.label.clone()).collect();
        if labels != op.blocks() {
            return Err(OpdmError::Serde(ErrorInfo::new(
                "block-layout",
                "snapshot blocks do not match the operator layout",
            )));
        }
        for entry in snapshot.blocks {
            match entry.matrix {
                Some(matrix) => op.set_block_from_matrix(&entry.label, matrix)?,
                None => op.set_zero_block(&entry.label)?,
            }
        }
        Ok(op)
    }
}
