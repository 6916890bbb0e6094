use std::io::Write;

use opdm_core::{BlockLabel, MoSpaces, SpaceKind, SubspaceTag};

fn tag(s: &str) -> SubspaceTag {
    SubspaceTag::new(s).unwrap()
}

#[test]
fn layout_exposes_dims_and_offsets() {
    let spaces = MoSpaces::from_dims(&[("o1", 2), ("o2", 1)], &[("v1", 3)]).unwrap();
    assert_eq!(spaces.n_subspaces(), 3);
    assert_eq!(spaces.n_orbs(), 6);
    assert_eq!(spaces.dim(&tag("v1")).unwrap(), 3);
    assert_eq!(spaces.offset(&tag("o2")).unwrap(), 2);
    assert_eq!(spaces.offset(&tag("v1")).unwrap(), 3);
    assert_eq!(spaces.kind(&tag("o2")), Some(SpaceKind::Occupied));
    assert_eq!(spaces.kind(&tag("v1")), Some(SpaceKind::Virtual));
    assert_eq!(spaces.kind(&tag("v9")), None);
    assert!(spaces.has_subspace(&tag("o2")));
    assert!(!spaces.has_subspace(&tag("v9")));
    let occupied: Vec<&str> = spaces.subspaces_occupied().map(|t| t.as_str()).collect();
    assert_eq!(occupied, ["o1", "o2"]);
    let virtuals: Vec<&str> = spaces.subspaces_virtual().map(|t| t.as_str()).collect();
    assert_eq!(virtuals, ["v1"]);
}

#[test]
fn invalid_layouts_are_rejected() {
    let err = MoSpaces::from_dims(&[], &[("v1", 3)]).unwrap_err();
    assert_eq!(err.code(), "no-occupied");
    let err = MoSpaces::from_dims(&[("o1", 2)], &[]).unwrap_err();
    assert_eq!(err.code(), "no-virtual");
    let err = MoSpaces::from_dims(&[("o1", 2)], &[("o1", 3)]).unwrap_err();
    assert_eq!(err.code(), "duplicate-tag");
    let err = MoSpaces::from_dims(&[("o1", 0)], &[("v1", 3)]).unwrap_err();
    assert_eq!(err.code(), "empty-subspace");
    let err = MoSpaces::from_dims(&[("o-1", 1)], &[("v1", 3)]).unwrap_err();
    assert_eq!(err.code(), "invalid-tag");
}

#[test]
fn layout_loads_from_yaml_and_json() {
    let yaml = "occupied:\n  - { tag: o1, dim: 2 }\nvirtual:\n  - { tag: v1, dim: 3 }\n";
    let from_yaml = MoSpaces::from_yaml_str(yaml).unwrap();
    let json = serde_json::to_string(&from_yaml).unwrap();
    let from_json = MoSpaces::from_json_str(&json).unwrap();
    assert_eq!(from_yaml, from_json);

    let bad = "occupied: []\nvirtual:\n  - { tag: v1, dim: 3 }\n";
    assert!(MoSpaces::from_yaml_str(bad).is_err());
}

#[test]
fn layout_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spaces.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "occupied:\n  - {{ tag: o1, dim: 4 }}\nvirtual:\n  - {{ tag: v1, dim: 6 }}"
    )
    .unwrap();
    let spaces = MoSpaces::load(&path).unwrap();
    assert_eq!(spaces.n_orbs(), 10);

    let other = dir.path().join("spaces.toml");
    std::fs::write(&other, "").unwrap();
    assert_eq!(MoSpaces::load(&other).unwrap_err().code(), "spaces-format");
}

#[test]
fn labels_parse_with_uneven_tags() {
    let spaces = MoSpaces::from_dims(&[("o1", 2), ("o10", 1)], &[("v1", 3)]).unwrap();
    let label = BlockLabel::parse("o10v1", &spaces).unwrap();
    assert_eq!(label, BlockLabel::new(tag("o10"), tag("v1")));
    assert_eq!(label.to_string(), "o10v1");
    assert_eq!(label.transpose_partner().to_string(), "v1o10");
    assert!(label.is_canonical(&spaces));
    assert!(!label.transpose_partner().is_canonical(&spaces));
    assert!(BlockLabel::parse("o1x", &spaces).is_err());
}

#[test]
fn ambiguous_labels_are_rejected() {
    let spaces = MoSpaces::from_dims(&[("a", 1), ("ab", 1)], &[("b", 1), ("bb", 1)]).unwrap();
    let err = BlockLabel::parse("abb", &spaces).unwrap_err();
    assert_eq!(err.code(), "ambiguous-label");
}
