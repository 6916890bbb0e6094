//! Shared vocabulary for block-structured one-particle operators: errors,
//! orbital-space layouts, block labels and the dense block backend.

#![deny(missing_docs)]

pub mod errors;
pub mod label;
pub mod schema;
pub mod spaces;
pub mod tensor;

pub use errors::{ErrorInfo, OpdmError};
pub use label::BlockLabel;
pub use schema::SchemaVersion;
pub use spaces::{MoSpaces, MoSpacesConfig, SpaceKind, Subspace, SubspaceTag};
pub use tensor::{
    validate_cartesian_transform, BlockSymmetry, BlockTensor, DEFAULT_SYMMETRY_TOLERANCE,
    TOTALLY_SYMMETRIC,
};
