//! Block-structured one-particle operators: construction, arithmetic and
//! symmetry-aware trace products.

#![deny(missing_docs)]

/// Whole-operator arithmetic.
pub mod arith;
/// Canonical hashing of operators.
pub mod hash;
/// Hartree-Fock reference density.
pub mod hf;
/// Block operators and their capability trait.
pub mod operator;
/// Operator construction options.
pub mod params;
/// Serde helpers for JSON artefacts.
#[path = "serde.rs"]
pub mod serde_io;
/// Serializable operator images.
pub mod snapshot;
/// Trace products of block operators.
pub mod trace;

pub use arith::{add, scale, sub};
pub use hash::operator_hash;
pub use hf::HfDensityMatrix;
pub use operator::{block_layout, BlockOperator, OneParticleOperator};
pub use params::OperatorOpts;
pub use snapshot::{BlockEntry, OperatorSnapshot, OPERATOR_SCHEMA};
pub use trace::{product_trace, try_product_trace, TraceCase};
