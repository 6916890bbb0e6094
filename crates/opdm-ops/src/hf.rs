use std::borrow::Cow;
use std::ops::Deref;

use opdm_core::errors::{ErrorInfo, OpdmError};
use opdm_core::{BlockLabel, BlockTensor, MoSpaces, SubspaceTag};

use crate::operator::{BlockOperator, OneParticleOperator};
use crate::params::OperatorOpts;

/// Occupied subspaces whose diagonal blocks hold the identity.
///
/// `o1` must exist; `o2` (core orbitals) is used when present.
const PRIMARY_OCCUPIED: [(&str, bool); 2] = [("o1", true), ("o2", false)];

/// Hartree-Fock one-particle density matrix.
///
/// Symmetric and totally symmetric, with identity blocks on the primary
/// occupied diagonal and zero everywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct HfDensityMatrix(OneParticleOperator);

impl HfDensityMatrix {
    /// Builds the reference density for `spaces`.
    pub fn new(spaces: &MoSpaces) -> Result<Self, OpdmError> {
        let mut op = OneParticleOperator::new(spaces, &OperatorOpts::symmetric())?;
        for (name, required) in PRIMARY_OCCUPIED {
            let tag = SubspaceTag::new(name)?;
            if !spaces.has_subspace(&tag) {
                if required {
                    return Err(OpdmError::Space(
                        ErrorInfo::new("missing-occupied", "layout lacks the occupied subspace")
                            .with_context("tag", name),
                    ));
                }
                continue;
            }
            if !spaces.subspaces_occupied().any(|occupied| occupied == &tag) {
                return Err(OpdmError::Space(
                    ErrorInfo::new("occupied-expected", "reference subspace is virtual")
                        .with_context("tag", name),
                ));
            }
            let dim = spaces.dim(&tag)?;
            op.set_block(&BlockLabel::new(tag.clone(), tag), BlockTensor::identity(dim))?;
        }
        Ok(Self(op))
    }

    /// Unwraps the underlying operator.
    pub fn into_inner(self) -> OneParticleOperator {
        self.0
    }
}

impl Deref for HfDensityMatrix {
    type Target = OneParticleOperator;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl BlockOperator for HfDensityMatrix {
    fn mospaces(&self) -> &MoSpaces {
        self.0.mospaces()
    }

    fn is_symmetric(&self) -> bool {
        self.0.is_symmetric()
    }

    fn cartesian_transform(&self) -> &str {
        self.0.cartesian_transform()
    }

    fn blocks(&self) -> Vec<BlockLabel> {
        self.0.blocks()
    }

    fn has_block(&self, label: &BlockLabel) -> bool {
        self.0.has_block(label)
    }

    fn is_zero_block(&self, label: &BlockLabel) -> bool {
        self.0.is_zero_block(label)
    }

    fn block(&self, label: &BlockLabel) -> Result<&BlockTensor, OpdmError> {
        self.0.block(label)
    }

    fn set_block(&mut self, label: &BlockLabel, tensor: BlockTensor) -> Result<(), OpdmError> {
        self.0.set_block(label, tensor)
    }

    fn block_view(&self, label: &BlockLabel) -> Result<Cow<'_, BlockTensor>, OpdmError> {
        self.0.block_view(label)
    }
}
