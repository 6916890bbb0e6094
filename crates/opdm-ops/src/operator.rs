//! Block-structured one-particle operators.
//!
//! A [`OneParticleOperator`] holds one dense block per pair of orbital
//! subspaces. Symmetric operators store only the canonical half (row subspace
//! not after column subspace in layout order) and synthesize the other half
//! by transposition on read, see [`BlockOperator::block_view`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use nalgebra::DMatrix;
use opdm_core::errors::{ErrorInfo, OpdmError};
use opdm_core::{
    validate_cartesian_transform, BlockLabel, BlockSymmetry, BlockTensor, MoSpaces, SubspaceTag,
};
use rand::Rng;
use tracing::debug;

use crate::params::OperatorOpts;

fn unknown_block(label: &BlockLabel) -> OpdmError {
    OpdmError::Block(
        ErrorInfo::new("unknown-block", "operator does not hold this block")
            .with_context("label", label.to_string()),
    )
}

/// Capability set shared by every block operator.
///
/// Reductions and arithmetic only talk to operators through this trait.
pub trait BlockOperator: Send + Sync {
    /// Orbital-space layout the operator is defined on.
    fn mospaces(&self) -> &MoSpaces;

    /// Whether transpose-partner blocks are related by transposition.
    fn is_symmetric(&self) -> bool;

    /// Cartesian transform descriptor of the operator.
    fn cartesian_transform(&self) -> &str;

    /// Labels of the explicitly stored blocks, sorted.
    fn blocks(&self) -> Vec<BlockLabel>;

    /// Whether `label` is explicitly stored.
    fn has_block(&self, label: &BlockLabel) -> bool {
        self.blocks().contains(label)
    }

    /// Whether the block `label` is known to vanish.
    ///
    /// Labels the operator has no data for, not even through a stored
    /// transpose partner, count as zero.
    fn is_zero_block(&self, label: &BlockLabel) -> bool;

    /// Stored, non-zero block `label`.
    fn block(&self, label: &BlockLabel) -> Result<&BlockTensor, OpdmError>;

    /// Replaces the block `label`, validating shape and symmetry.
    fn set_block(&mut self, label: &BlockLabel, tensor: BlockTensor) -> Result<(), OpdmError>;

    /// Block `label`, transposing the stored partner of a symmetric operator if needed.
    fn block_view(&self, label: &BlockLabel) -> Result<Cow<'_, BlockTensor>, OpdmError> {
        if self.has_block(label) {
            return self.block(label).map(Cow::Borrowed);
        }
        let partner = label.transpose_partner();
        if self.is_symmetric() && self.has_block(&partner) {
            return self
                .block(&partner)
                .map(|tensor| Cow::Owned(tensor.transpose()));
        }
        Err(unknown_block(label))
    }
}

/// Labels stored by an operator on `spaces`, in sorted order.
pub fn block_layout(spaces: &MoSpaces, is_symmetric: bool) -> Vec<BlockLabel> {
    let mut labels = Vec::new();
    for row in spaces.subspaces() {
        for col in spaces.subspaces() {
            let label = BlockLabel::new(row.tag.clone(), col.tag.clone());
            if !is_symmetric || label.is_canonical(spaces) {
                labels.push(label);
            }
        }
    }
    labels.sort();
    labels
}

/// One-particle operator with one dense block per pair of subspaces.
///
/// A block slot holding `None` is flagged as identically zero.
#[derive(Debug, Clone, PartialEq)]
pub struct OneParticleOperator {
    spaces: MoSpaces,
    opts: OperatorOpts,
    blocks: BTreeMap<BlockLabel, Option<BlockTensor>>,
}

impl OneParticleOperator {
    /// Builds an operator whose blocks are symmetry-respecting zero tensors.
    pub fn new(spaces: &MoSpaces, opts: &OperatorOpts) -> Result<Self, OpdmError> {
        let opts = opts.sanitised();
        validate_cartesian_transform(&opts.cartesian_transform)?;
        let mut blocks = BTreeMap::new();
        for label in block_layout(spaces, opts.is_symmetric) {
            let tensor = BlockTensor::zeros_for(
                spaces,
                &label,
                opts.is_symmetric,
                &opts.cartesian_transform,
            )?;
            blocks.insert(label, Some(tensor));
        }
        debug!(
            blocks = blocks.len(),
            symmetric = opts.is_symmetric,
            transform = %opts.cartesian_transform,
            "constructed one-particle operator"
        );
        Ok(Self {
            spaces: spaces.clone(),
            opts,
            blocks,
        })
    }

    /// Operator with the same layout and options and all blocks set to zero tensors.
    pub fn zeros_like(&self) -> Self {
        let blocks = self
            .blocks
            .keys()
            .map(|label| {
                let symmetry = self.block_symmetry(label);
                let rows = self.dim_or_zero(&label.row);
                let cols = self.dim_or_zero(&label.col);
                (label.clone(), Some(BlockTensor::zeros(rows, cols, symmetry)))
            })
            .collect();
        Self {
            spaces: self.spaces.clone(),
            opts: self.opts.clone(),
            blocks,
        }
    }

    /// Construction options of the operator.
    pub fn opts(&self) -> &OperatorOpts {
        &self.opts
    }

    /// Stored labels whose blocks are not flagged zero.
    pub fn blocks_nonzero(&self) -> Vec<BlockLabel> {
        self.blocks
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Flags block `label` (or its stored partner) as identically zero.
    pub fn set_zero_block(&mut self, label: &BlockLabel) -> Result<(), OpdmError> {
        let (target, _) = self
            .resolve_stored(label)
            .ok_or_else(|| unknown_block(label))?;
        self.blocks.insert(target, None);
        Ok(())
    }

    /// Replaces block `label` with a dense matrix.
    pub fn set_block_from_matrix(
        &mut self,
        label: &BlockLabel,
        matrix: DMatrix<f64>,
    ) -> Result<(), OpdmError> {
        self.set_block(label, BlockTensor::from_matrix(matrix, BlockSymmetry::none(), 0.0)?)
    }

    /// Fills every stored block with random entries in `[-1, 1)`.
    pub fn set_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), OpdmError> {
        let labels: Vec<BlockLabel> = self.blocks.keys().cloned().collect();
        for label in labels {
            let rows = self.spaces.dim(&label.row)?;
            let cols = self.spaces.dim(&label.col)?;
            let tensor = BlockTensor::random(rows, cols, self.block_symmetry(&label), rng)?;
            self.blocks.insert(label, Some(tensor));
        }
        Ok(())
    }

    /// Operator with every block multiplied by `factor`; zero flags are kept.
    pub fn scaled(&self, factor: f64) -> Self {
        let blocks = self
            .blocks
            .iter()
            .map(|(label, slot)| (label.clone(), slot.as_ref().map(|t| t.scale(factor))))
            .collect();
        Self {
            spaces: self.spaces.clone(),
            opts: self.opts.clone(),
            blocks,
        }
    }

    /// Assembles the full orbital matrix in layout order.
    pub fn to_dense(&self) -> Result<DMatrix<f64>, OpdmError> {
        let n = self.spaces.n_orbs();
        let mut dense = DMatrix::zeros(n, n);
        for row in self.spaces.subspaces() {
            for col in self.spaces.subspaces() {
                let label = BlockLabel::new(row.tag.clone(), col.tag.clone());
                if self.is_zero_block(&label) {
                    continue;
                }
                let view = self.block_view(&label)?;
                let r0 = self.spaces.offset(&row.tag)?;
                let c0 = self.spaces.offset(&col.tag)?;
                dense
                    .view_mut((r0, c0), (row.dim, col.dim))
                    .copy_from(view.matrix());
            }
        }
        Ok(dense)
    }

    /// Stored label holding the data of `label`, and whether it is transposed.
    fn resolve_stored(&self, label: &BlockLabel) -> Option<(BlockLabel, bool)> {
        if self.blocks.contains_key(label) {
            return Some((label.clone(), false));
        }
        let partner = label.transpose_partner();
        if self.opts.is_symmetric && self.blocks.contains_key(&partner) {
            return Some((partner, true));
        }
        None
    }

    fn block_symmetry(&self, label: &BlockLabel) -> BlockSymmetry {
        BlockSymmetry {
            symmetric: self.opts.is_symmetric && label.is_diagonal(),
            cartesian_transform: self.opts.cartesian_transform.clone(),
        }
    }

    fn dim_or_zero(&self, tag: &SubspaceTag) -> usize {
        self.spaces.dim(tag).unwrap_or(0)
    }
}

impl BlockOperator for OneParticleOperator {
    fn mospaces(&self) -> &MoSpaces {
        &self.spaces
    }

    fn is_symmetric(&self) -> bool {
        self.opts.is_symmetric
    }

    fn cartesian_transform(&self) -> &str {
        &self.opts.cartesian_transform
    }

    fn blocks(&self) -> Vec<BlockLabel> {
        self.blocks.keys().cloned().collect()
    }

    fn has_block(&self, label: &BlockLabel) -> bool {
        self.blocks.contains_key(label)
    }

    fn is_zero_block(&self, label: &BlockLabel) -> bool {
        match self.resolve_stored(label) {
            Some((target, _)) => matches!(self.blocks.get(&target), Some(None)),
            None => true,
        }
    }

    fn block(&self, label: &BlockLabel) -> Result<&BlockTensor, OpdmError> {
        match self.blocks.get(label) {
            Some(Some(tensor)) => Ok(tensor),
            Some(None) => Err(OpdmError::Block(
                ErrorInfo::new("zero-block", "block is flagged as zero")
                    .with_context("label", label.to_string()),
            )),
            None => Err(unknown_block(label)),
        }
    }

    fn set_block(&mut self, label: &BlockLabel, tensor: BlockTensor) -> Result<(), OpdmError> {
        let (target, transposed) = self
            .resolve_stored(label)
            .ok_or_else(|| unknown_block(label))?;
        let tensor = if transposed { tensor.transpose() } else { tensor };
        let expected = (self.spaces.dim(&target.row)?, self.spaces.dim(&target.col)?);
        if tensor.shape() != expected {
            return Err(OpdmError::Block(
                ErrorInfo::new("shape-mismatch", "block shape does not match its subspaces")
                    .with_context("label", label.to_string())
                    .with_context("expected", format!("{}x{}", expected.0, expected.1))
                    .with_context(
                        "actual",
                        format!("{}x{}", tensor.shape().0, tensor.shape().1),
                    ),
            ));
        }
        let tensor =
            tensor.with_symmetry(self.block_symmetry(&target), self.opts.symmetry_tolerance)?;
        self.blocks.insert(target, Some(tensor));
        Ok(())
    }
}
