//! Block labels naming a (row subspace, column subspace) pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OpdmError};
use crate::spaces::{MoSpaces, SubspaceTag};

/// Identifier of a single block of a one-particle operator.
///
/// Displays as the concatenation of both tags, e.g. `o1v1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockLabel {
    /// Subspace indexing the rows of the block.
    pub row: SubspaceTag,
    /// Subspace indexing the columns of the block.
    pub col: SubspaceTag,
}

impl BlockLabel {
    /// Creates a label from its row and column subspaces.
    pub fn new(row: SubspaceTag, col: SubspaceTag) -> Self {
        Self { row, col }
    }

    /// Returns the label with row and column swapped.
    pub fn transpose_partner(&self) -> Self {
        Self {
            row: self.col.clone(),
            col: self.row.clone(),
        }
    }

    /// Whether row and column refer to the same subspace.
    pub fn is_diagonal(&self) -> bool {
        self.row == self.col
    }

    /// Whether the label lies in the stored half of a symmetric operator.
    ///
    /// Returns `false` when either tag is unknown to `spaces`.
    pub fn is_canonical(&self, spaces: &MoSpaces) -> bool {
        match (spaces.position(&self.row), spaces.position(&self.col)) {
            (Some(row), Some(col)) => row <= col,
            _ => false,
        }
    }

    /// Parses a concatenated label such as `o1v1` against the tags of `spaces`.
    ///
    /// Tags may have different lengths; the split must be unique.
    pub fn parse(label: &str, spaces: &MoSpaces) -> Result<Self, OpdmError> {
        let mut matches = spaces.subspaces().filter_map(|row| {
            let rest = label.strip_prefix(row.tag.as_str())?;
            spaces
                .subspaces()
                .find(|col| col.tag.as_str() == rest)
                .map(|col| BlockLabel::new(row.tag.clone(), col.tag.clone()))
        });
        let first = matches.next().ok_or_else(|| {
            OpdmError::Block(
                ErrorInfo::new("unknown-label", "label does not name two known subspaces")
                    .with_context("label", label),
            )
        })?;
        if matches.next().is_some() {
            return Err(OpdmError::Block(
                ErrorInfo::new("ambiguous-label", "label splits into subspaces in several ways")
                    .with_context("label", label),
            ));
        }
        Ok(first)
    }
}

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.col)
    }
}
