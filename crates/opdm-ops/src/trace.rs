//! Weighted trace of the product of two block operators.
//!
//! The reduction sums `dot(op1[b], op2[b])` over block labels. Which blocks
//! are visited, whether a block must be rebuilt from its transpose partner
//! and how it is weighted depend on the symmetry of both operands, see
//! [`TraceCase`].

use std::collections::BTreeSet;
use std::fmt;

use opdm_core::errors::{ErrorInfo, OpdmError};
use opdm_core::BlockLabel;
use tracing::debug;

use crate::operator::BlockOperator;

/// Symmetry combination of the two operands of a trace product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCase {
    /// Both operands store only the canonical half.
    BothSymmetric,
    /// Only the first operand is symmetric.
    FirstSymmetric,
    /// Only the second operand is symmetric.
    SecondSymmetric,
    /// Both operands store every block.
    NeitherSymmetric,
}

impl TraceCase {
    /// Classifies a pair of operands.
    pub fn classify(op1: &dyn BlockOperator, op2: &dyn BlockOperator) -> Self {
        match (op1.is_symmetric(), op2.is_symmetric()) {
            (true, true) => TraceCase::BothSymmetric,
            (true, false) => TraceCase::FirstSymmetric,
            (false, true) => TraceCase::SecondSymmetric,
            (false, false) => TraceCase::NeitherSymmetric,
        }
    }

    fn requires_equal_blocks(self) -> bool {
        matches!(self, TraceCase::BothSymmetric | TraceCase::NeitherSymmetric)
    }
}

impl fmt::Display for TraceCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceCase::BothSymmetric => "symmetric/symmetric",
            TraceCase::FirstSymmetric => "symmetric/general",
            TraceCase::SecondSymmetric => "general/symmetric",
            TraceCase::NeitherSymmetric => "general/general",
        };
        f.write_str(name)
    }
}

/// Weighted trace of `op1 · op2`.
///
/// # Panics
///
/// Panics when both operands share their symmetry but not their block sets,
/// or when matching blocks have different shapes. Use [`try_product_trace`]
/// to receive these as errors instead.
pub fn product_trace(op1: &dyn BlockOperator, op2: &dyn BlockOperator) -> f64 {
    match try_product_trace(op1, op2) {
        Ok(value) => value,
        Err(err) => panic!("product_trace: {err}"),
    }
}

/// Weighted trace of `op1 · op2`, reporting violated preconditions as errors.
///
/// Blocks flagged zero in either operand contribute nothing. Candidates are
/// visited in sorted label order so the floating point sum is reproducible.
pub fn try_product_trace(
    op1: &dyn BlockOperator,
    op2: &dyn BlockOperator,
) -> Result<f64, OpdmError> {
    let case = TraceCase::classify(op1, op2);
    let blocks1 = op1.blocks();
    let blocks2 = op2.blocks();
    if case.requires_equal_blocks() && blocks1 != blocks2 {
        return Err(OpdmError::Precondition(
            ErrorInfo::new("block-set-mismatch", "operands must store identical blocks")
                .with_context("case", case.to_string())
                .with_context("lhs_blocks", blocks1.len().to_string())
                .with_context("rhs_blocks", blocks2.len().to_string()),
        ));
    }
    let stored1: BTreeSet<&BlockLabel> = blocks1.iter().collect();
    let stored2: BTreeSet<&BlockLabel> = blocks2.iter().collect();
    let candidates: BTreeSet<&BlockLabel> = stored1.union(&stored2).copied().collect();

    let mut total = 0.0;
    let mut contributing = 0usize;
    for b in candidates.iter().copied() {
        if op1.is_zero_block(b) || op2.is_zero_block(b) {
            continue;
        }
        let tb = b.transpose_partner();
        let term = match case {
            TraceCase::BothSymmetric => {
                let weight = if *b == tb { 1.0 } else { 2.0 };
                Some(weight * op1.block(b)?.dot(op2.block(b)?)?)
            }
            TraceCase::FirstSymmetric => {
                if stored1.contains(b) {
                    Some(op1.block(b)?.dot(op2.block(b)?)?)
                } else if stored1.contains(&tb) {
                    Some(op1.block(&tb)?.transpose().dot(op2.block(b)?)?)
                } else {
                    None
                }
            }
            TraceCase::SecondSymmetric => {
                if stored2.contains(b) {
                    Some(op2.block(b)?.dot(op1.block(b)?)?)
                } else if stored2.contains(&tb) && !op2.is_zero_block(&tb) {
                    Some(op2.block(&tb)?.transpose().dot(op1.block(b)?)?)
                } else {
                    None
                }
            }
            TraceCase::NeitherSymmetric => Some(op1.block(b)?.dot(op2.block(b)?)?),
        };
        if let Some(value) = term {
            total += value;
            contributing += 1;
        }
    }

    debug!(
        case = %case,
        candidates = candidates.len(),
        contributing,
        value = total,
        "product trace"
    );
    Ok(total)
}
