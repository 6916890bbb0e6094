#![allow(dead_code)]

use opdm_core::{BlockLabel, MoSpaces};
use opdm_ops::{BlockOperator, OneParticleOperator, OperatorOpts};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn spaces_small() -> MoSpaces {
    MoSpaces::from_dims(&[("o1", 2)], &[("v1", 3)]).unwrap()
}

pub fn spaces_cvs() -> MoSpaces {
    MoSpaces::from_dims(&[("o1", 3), ("o2", 1)], &[("v1", 4)]).unwrap()
}

pub fn label(text: &str, spaces: &MoSpaces) -> BlockLabel {
    BlockLabel::parse(text, spaces).unwrap()
}

pub fn random_operator(spaces: &MoSpaces, opts: &OperatorOpts, seed: u64) -> OneParticleOperator {
    let mut op = OneParticleOperator::new(spaces, opts).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    op.set_random(&mut rng).unwrap();
    op
}

/// Sum of the elementwise product of both dense matrices.
pub fn dense_trace(a: &OneParticleOperator, b: &OneParticleOperator) -> f64 {
    a.to_dense().unwrap().component_mul(&b.to_dense().unwrap()).sum()
}

pub fn assert_close(actual: f64, expected: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= 1e-10 * scale,
        "expected {expected}, got {actual}"
    );
}

pub fn zero_all_but(op: &mut OneParticleOperator, keep: &[BlockLabel]) {
    for label in op.blocks() {
        if !keep.contains(&label) {
            op.set_zero_block(&label).unwrap();
        }
    }
}
