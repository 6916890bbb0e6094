mod common;

use common::{label, random_operator, spaces_cvs, spaces_small};
use nalgebra::DMatrix;
use opdm_core::{BlockSymmetry, BlockTensor};
use opdm_ops::{block_layout, BlockOperator, OneParticleOperator, OperatorOpts};

#[test]
fn symmetric_operators_store_the_canonical_half() {
    let spaces = spaces_cvs();
    let op = OneParticleOperator::new(&spaces, &OperatorOpts::symmetric()).unwrap();
    let names: Vec<String> = op.blocks().iter().map(ToString::to_string).collect();
    assert_eq!(names, ["o1o1", "o1o2", "o1v1", "o2o2", "o2v1", "v1v1"]);
    assert!(op.blocks().iter().all(|b| !op.is_zero_block(b)));
    assert!(op.blocks().iter().all(|b| op.block(b).unwrap().is_zero()));
    assert_eq!(op.block(&label("o1v1", &spaces)).unwrap().shape(), (3, 4));
}

#[test]
fn asymmetric_operators_store_every_block() {
    let spaces = spaces_cvs();
    let op = OneParticleOperator::new(&spaces, &OperatorOpts::asymmetric()).unwrap();
    assert_eq!(op.blocks().len(), 9);
    assert_eq!(op.blocks(), block_layout(&spaces, false));
    assert_eq!(op.block(&label("v1o2", &spaces)).unwrap().shape(), (4, 1));
    assert!(!op.block(&label("o1o1", &spaces)).unwrap().symmetry().symmetric);
}

#[test]
fn transform_is_recorded_and_validated() {
    let spaces = spaces_small();
    let opts = OperatorOpts::symmetric().with_transform("x");
    let op = OneParticleOperator::new(&spaces, &opts).unwrap();
    assert_eq!(op.cartesian_transform(), "x");
    let block = op.block(&label("o1o1", &spaces)).unwrap();
    assert_eq!(block.symmetry().cartesian_transform, "x");

    let err = OneParticleOperator::new(&spaces, &OperatorOpts::symmetric().with_transform("r"))
        .unwrap_err();
    assert_eq!(err.code(), "invalid-transform");
}

#[test]
fn transpose_partners_agree_once_materialised() {
    let spaces = spaces_cvs();
    let op = random_operator(&spaces, &OperatorOpts::symmetric(), 11);
    for b in op.blocks() {
        let tb = b.transpose_partner();
        let stored = op.block_view(&b).unwrap();
        let derived = op.block_view(&tb).unwrap();
        assert_eq!(derived.matrix(), &stored.matrix().transpose());
    }
    let dense = op.to_dense().unwrap();
    assert!((&dense - dense.transpose()).amax() < 1e-14);
}

#[test]
fn set_block_through_the_transposed_label() {
    let spaces = spaces_small();
    let mut op = OneParticleOperator::new(&spaces, &OperatorOpts::symmetric()).unwrap();
    let vo = DMatrix::from_fn(3, 2, |i, j| (10 * i + j) as f64);
    op.set_block_from_matrix(&label("v1o1", &spaces), vo.clone()).unwrap();
    assert!(!op.has_block(&label("v1o1", &spaces)));
    assert_eq!(op.block(&label("o1v1", &spaces)).unwrap().matrix(), &vo.transpose());
    assert_eq!(op.block_view(&label("v1o1", &spaces)).unwrap().matrix(), &vo);
}

#[test]
fn set_block_validates_shape_and_symmetry() {
    let spaces = spaces_small();
    let mut op = OneParticleOperator::new(&spaces, &OperatorOpts::symmetric()).unwrap();
    let err = op
        .set_block_from_matrix(&label("o1v1", &spaces), DMatrix::zeros(3, 3))
        .unwrap_err();
    assert_eq!(err.code(), "shape-mismatch");

    let skew = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 0.0]);
    let err = op
        .set_block_from_matrix(&label("o1o1", &spaces), skew.clone())
        .unwrap_err();
    assert_eq!(err.code(), "symmetry-violation");

    let mut general = OneParticleOperator::new(&spaces, &OperatorOpts::asymmetric()).unwrap();
    general
        .set_block_from_matrix(&label("o1o1", &spaces), skew)
        .unwrap();

    let tensor = BlockTensor::zeros(2, 2, BlockSymmetry::none());
    let other = opdm_core::MoSpaces::from_dims(&[("o1", 2)], &[("v2", 2)]).unwrap();
    let err = op.set_block(&label("o1v2", &other), tensor).unwrap_err();
    assert_eq!(err.code(), "unknown-block");
}

#[test]
fn zero_flags_cover_both_halves() {
    let spaces = spaces_small();
    let mut op = random_operator(&spaces, &OperatorOpts::symmetric(), 5);
    let ov = label("o1v1", &spaces);
    let vo = label("v1o1", &spaces);
    assert!(!op.is_zero_block(&vo));
    op.set_zero_block(&vo).unwrap();
    assert!(op.is_zero_block(&ov));
    assert!(op.is_zero_block(&vo));
    assert_eq!(op.block(&ov).unwrap_err().code(), "zero-block");
    assert_eq!(op.blocks_nonzero().len(), 2);

    let dense = op.to_dense().unwrap();
    assert!(dense.view((0, 2), (2, 3)).iter().all(|v| *v == 0.0));
    assert!(dense.view((2, 0), (3, 2)).iter().all(|v| *v == 0.0));
}

#[test]
fn unknown_labels_read_as_zero() {
    let spaces = spaces_small();
    let op = OneParticleOperator::new(&spaces, &OperatorOpts::asymmetric()).unwrap();
    let other = opdm_core::MoSpaces::from_dims(&[("o1", 2)], &[("v7", 1)]).unwrap();
    let missing = label("o1v7", &other);
    assert!(op.is_zero_block(&missing));
    assert_eq!(op.block_view(&missing).unwrap_err().code(), "unknown-block");
}

#[test]
fn dense_assembly_places_blocks_at_offsets() {
    let spaces = spaces_small();
    let mut op = OneParticleOperator::new(&spaces, &OperatorOpts::asymmetric()).unwrap();
    op.set_block_from_matrix(&label("v1o1", &spaces), DMatrix::from_element(3, 2, 1.5))
        .unwrap();
    let dense = op.to_dense().unwrap();
    assert_eq!(dense.shape(), (5, 5));
    assert_eq!(dense[(2, 0)], 1.5);
    assert_eq!(dense[(4, 1)], 1.5);
    assert_eq!(dense[(0, 2)], 0.0);
    assert_eq!(dense.sum(), 9.0);
}
