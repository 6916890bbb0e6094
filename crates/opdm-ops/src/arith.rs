//! Whole-operator arithmetic.
//!
//! Both operands must expose the same block structure: identical stored
//! labels, identical symmetry and equally shaped blocks. Anything else is a
//! [`OpdmError::Contract`] error. Operands are never modified.

use std::ops::{Add, Mul, Sub};

use opdm_core::errors::{ErrorInfo, OpdmError};
use opdm_core::{BlockLabel, BlockTensor};
use tracing::trace;

use crate::operator::{BlockOperator, OneParticleOperator};

fn check_compatible(
    lhs: &OneParticleOperator,
    rhs: &dyn BlockOperator,
    op: &str,
) -> Result<(), OpdmError> {
    if lhs.is_symmetric() != rhs.is_symmetric() {
        return Err(OpdmError::Contract(
            ErrorInfo::new("symmetry-mismatch", "operands differ in symmetry")
                .with_context("op", op)
                .with_context("lhs_symmetric", lhs.is_symmetric().to_string())
                .with_context("rhs_symmetric", rhs.is_symmetric().to_string()),
        ));
    }
    let lhs_blocks = lhs.blocks();
    let rhs_blocks = rhs.blocks();
    if lhs_blocks != rhs_blocks {
        return Err(OpdmError::Contract(
            ErrorInfo::new("block-mismatch", "operands do not store the same blocks")
                .with_context("op", op)
                .with_context("lhs_blocks", join(&lhs_blocks))
                .with_context("rhs_blocks", join(&rhs_blocks)),
        ));
    }
    Ok(())
}

fn join(labels: &[BlockLabel]) -> String {
    labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn combine<F>(
    lhs: &OneParticleOperator,
    rhs: &dyn BlockOperator,
    op: &str,
    f: F,
) -> Result<OneParticleOperator, OpdmError>
where
    F: Fn(&BlockTensor, &BlockTensor) -> Result<BlockTensor, OpdmError>,
{
    check_compatible(lhs, rhs, op)?;
    let mut ret = lhs.zeros_like();
    for label in lhs.blocks() {
        let lhs_zero = lhs.is_zero_block(&label);
        let rhs_zero = rhs.is_zero_block(&label);
        if lhs_zero && rhs_zero {
            ret.set_zero_block(&label)?;
            continue;
        }
        let zero = ret.block(&label)?.clone();
        let a = if lhs_zero { &zero } else { lhs.block(&label)? };
        let b = if rhs_zero { &zero } else { rhs.block(&label)? };
        let value = f(a, b).map_err(|err| {
            OpdmError::Contract(
                ErrorInfo::new("block-incompatible", err.info().message.clone())
                    .with_context("op", op)
                    .with_context("label", label.to_string()),
            )
        })?;
        ret.set_block(&label, value)?;
    }
    trace!(op, blocks = ret.blocks().len(), "combined operators");
    Ok(ret)
}

/// Blockwise sum `lhs + rhs` as a new operator shaped like `lhs`.
pub fn add(
    lhs: &OneParticleOperator,
    rhs: &dyn BlockOperator,
) -> Result<OneParticleOperator, OpdmError> {
    combine(lhs, rhs, "add", |a, b| a.add(b))
}

/// Blockwise difference `lhs - rhs` as a new operator shaped like `lhs`.
pub fn sub(
    lhs: &OneParticleOperator,
    rhs: &dyn BlockOperator,
) -> Result<OneParticleOperator, OpdmError> {
    combine(lhs, rhs, "sub", |a, b| a.sub(b))
}

/// Operator multiplied by `factor`.
pub fn scale(op: &OneParticleOperator, factor: f64) -> OneParticleOperator {
    op.scaled(factor)
}

impl Add for &OneParticleOperator {
    type Output = Result<OneParticleOperator, OpdmError>;

    fn add(self, rhs: Self) -> Self::Output {
        add(self, rhs)
    }
}

impl Sub for &OneParticleOperator {
    type Output = Result<OneParticleOperator, OpdmError>;

    fn sub(self, rhs: Self) -> Self::Output {
        sub(self, rhs)
    }
}

impl Mul<f64> for &OneParticleOperator {
    type Output = OneParticleOperator;

    fn mul(self, factor: f64) -> Self::Output {
        scale(self, factor)
    }
}
