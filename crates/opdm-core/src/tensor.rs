//! Dense block tensors backing each block of a one-particle operator.
//!
//! Every block is a real matrix together with a [`BlockSymmetry`] descriptor.
//! The descriptor records whether the block must equal its own transpose
//! (diagonal blocks of symmetric operators) and the cartesian transform the
//! operator carries.

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OpdmError};
use crate::label::BlockLabel;
use crate::spaces::MoSpaces;

/// Default absolute tolerance when checking that a block is symmetric.
pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Transform descriptor of a totally symmetric operator.
pub const TOTALLY_SYMMETRIC: &str = "1";

fn shape_string(shape: (usize, usize)) -> String {
    format!("{}x{}", shape.0, shape.1)
}

fn check_square(shape: (usize, usize)) -> Result<(), OpdmError> {
    if shape.0 == shape.1 {
        return Ok(());
    }
    Err(OpdmError::Block(
        ErrorInfo::new("non-square-symmetric", "symmetric blocks must be square")
            .with_context("shape", shape_string(shape)),
    ))
}

/// Checks that `transform` is `"1"` or a non-empty word over `x`, `y` and `z`.
pub fn validate_cartesian_transform(transform: &str) -> Result<(), OpdmError> {
    let valid = transform == TOTALLY_SYMMETRIC
        || (!transform.is_empty() && transform.chars().all(|c| matches!(c, 'x' | 'y' | 'z')));
    if valid {
        Ok(())
    } else {
        Err(OpdmError::Block(
            ErrorInfo::new("invalid-transform", "malformed cartesian transform")
                .with_context("transform", transform)
                .with_hint("use \"1\" or a product of x, y and z such as \"xy\""),
        ))
    }
}

/// Symmetry carried by a single block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSymmetry {
    /// Whether the block must equal its own transpose.
    pub symmetric: bool,
    /// Cartesian transform of the owning operator.
    pub cartesian_transform: String,
}

impl BlockSymmetry {
    /// Descriptor of a block without any index symmetry.
    pub fn none() -> Self {
        Self {
            symmetric: false,
            cartesian_transform: TOTALLY_SYMMETRIC.to_string(),
        }
    }

    /// Descriptor of the block `label` inside an operator with the given symmetry.
    pub fn for_block(
        label: &BlockLabel,
        operator_symmetric: bool,
        cartesian_transform: &str,
    ) -> Result<Self, OpdmError> {
        validate_cartesian_transform(cartesian_transform)?;
        Ok(Self {
            symmetric: operator_symmetric && label.is_diagonal(),
            cartesian_transform: cartesian_transform.to_string(),
        })
    }
}

/// Dense real block with its symmetry descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTensor {
    matrix: DMatrix<f64>,
    symmetry: BlockSymmetry,
}

impl BlockTensor {
    /// Zero block of the given shape.
    pub fn zeros(rows: usize, cols: usize, symmetry: BlockSymmetry) -> Self {
        Self {
            matrix: DMatrix::zeros(rows, cols),
            symmetry,
        }
    }

    /// Symmetry-respecting zero block for `label` in the layout `spaces`.
    pub fn zeros_for(
        spaces: &MoSpaces,
        label: &BlockLabel,
        operator_symmetric: bool,
        cartesian_transform: &str,
    ) -> Result<Self, OpdmError> {
        let rows = spaces.dim(&label.row)?;
        let cols = spaces.dim(&label.col)?;
        let symmetry = BlockSymmetry::for_block(label, operator_symmetric, cartesian_transform)?;
        Ok(Self::zeros(rows, cols, symmetry))
    }

    /// Identity block of dimension `dim`.
    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: DMatrix::identity(dim, dim),
            symmetry: BlockSymmetry {
                symmetric: true,
                cartesian_transform: TOTALLY_SYMMETRIC.to_string(),
            },
        }
    }

    /// Wraps `matrix`, rejecting it if it breaks `symmetry` beyond `tolerance`.
    pub fn from_matrix(
        matrix: DMatrix<f64>,
        symmetry: BlockSymmetry,
        tolerance: f64,
    ) -> Result<Self, OpdmError> {
        validate_cartesian_transform(&symmetry.cartesian_transform)?;
        if symmetry.symmetric {
            check_square(matrix.shape())?;
            let deviation = (&matrix - matrix.transpose()).amax();
            if deviation > tolerance {
                return Err(OpdmError::Block(
                    ErrorInfo::new("symmetry-violation", "block is not symmetric")
                        .with_context("deviation", format!("{deviation:e}"))
                        .with_context("tolerance", format!("{tolerance:e}")),
                ));
            }
        }
        Ok(Self { matrix, symmetry })
    }

    /// Random block with entries in `[-1, 1)`, symmetrised when required.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        symmetry: BlockSymmetry,
        rng: &mut R,
    ) -> Result<Self, OpdmError> {
        validate_cartesian_transform(&symmetry.cartesian_transform)?;
        if symmetry.symmetric {
            check_square((rows, cols))?;
        }
        let mut matrix = DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0..1.0));
        if symmetry.symmetric {
            matrix = (&matrix + matrix.transpose()) * 0.5;
        }
        Ok(Self { matrix, symmetry })
    }

    /// Re-labels the block with `symmetry` after validating it.
    pub fn with_symmetry(
        self,
        symmetry: BlockSymmetry,
        tolerance: f64,
    ) -> Result<Self, OpdmError> {
        Self::from_matrix(self.matrix, symmetry, tolerance)
    }

    /// Number of rows and columns.
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// Borrow the dense matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Symmetry descriptor of the block.
    pub fn symmetry(&self) -> &BlockSymmetry {
        &self.symmetry
    }

    /// Whether every entry is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.matrix.iter().all(|value| *value == 0.0)
    }

    fn check_same_shape(&self, other: &BlockTensor, op: &str) -> Result<(), OpdmError> {
        if self.shape() == other.shape() {
            return Ok(());
        }
        Err(OpdmError::Block(
            ErrorInfo::new("shape-mismatch", "blocks have different shapes")
                .with_context("op", op)
                .with_context("lhs", shape_string(self.shape()))
                .with_context("rhs", shape_string(other.shape())),
        ))
    }

    /// Full contraction of two equally shaped blocks.
    pub fn dot(&self, other: &BlockTensor) -> Result<f64, OpdmError> {
        self.check_same_shape(other, "dot")?;
        Ok(self.matrix.dot(&other.matrix))
    }

    /// Block with both index groups swapped.
    pub fn transpose(&self) -> BlockTensor {
        Self {
            matrix: self.matrix.transpose(),
            symmetry: self.symmetry.clone(),
        }
    }

    /// Elementwise sum; keeps the symmetry of `self`.
    pub fn add(&self, other: &BlockTensor) -> Result<BlockTensor, OpdmError> {
        self.check_same_shape(other, "add")?;
        Ok(Self {
            matrix: &self.matrix + &other.matrix,
            symmetry: self.symmetry.clone(),
        })
    }

    /// Elementwise difference; keeps the symmetry of `self`.
    pub fn sub(&self, other: &BlockTensor) -> Result<BlockTensor, OpdmError> {
        self.check_same_shape(other, "sub")?;
        Ok(Self {
            matrix: &self.matrix - &other.matrix,
            symmetry: self.symmetry.clone(),
        })
    }

    /// Block multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> BlockTensor {
        Self {
            matrix: &self.matrix * factor,
            symmetry: self.symmetry.clone(),
        }
    }
}

impl Default for BlockSymmetry {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_grammar() {
        assert!(validate_cartesian_transform("1").is_ok());
        assert!(validate_cartesian_transform("xyz").is_ok());
        assert!(validate_cartesian_transform("").is_err());
        assert!(validate_cartesian_transform("xw").is_err());
    }

    #[test]
    fn identity_is_symmetric() {
        let id = BlockTensor::identity(3);
        assert!(id.symmetry().symmetric);
        assert_eq!(id.dot(&id).unwrap(), 3.0);
    }
}
