//! Orbital subspace tags and the occupied/virtual layout they live in.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OpdmError};

fn space_error(code: &str, message: impl Into<String>) -> OpdmError {
    OpdmError::Space(ErrorInfo::new(code, message))
}

/// Opaque identifier of an orbital subspace such as `o1` or `v1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubspaceTag(String);

impl SubspaceTag {
    /// Creates a tag after checking it is a non-empty ASCII alphanumeric word.
    pub fn new(tag: impl Into<String>) -> Result<Self, OpdmError> {
        let tag = tag.into();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OpdmError::Space(
                ErrorInfo::new("invalid-tag", "subspace tags must be non-empty alphanumeric")
                    .with_context("tag", tag),
            ));
        }
        Ok(Self(tag))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubspaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubspaceTag {
    type Error = OpdmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SubspaceTag {
    type Error = OpdmError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubspaceTag> for String {
    fn from(tag: SubspaceTag) -> Self {
        tag.0
    }
}

/// Whether a subspace holds occupied or virtual orbitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceKind {
    /// Occupied orbitals.
    Occupied,
    /// Virtual orbitals.
    Virtual,
}

/// A named subspace together with its number of orbitals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subspace {
    /// Identifier of the subspace.
    pub tag: SubspaceTag,
    /// Number of orbitals spanned by the subspace.
    pub dim: usize,
}

/// On-disk shape of an orbital-space layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoSpacesConfig {
    /// Occupied subspaces in canonical order.
    pub occupied: Vec<Subspace>,
    /// Virtual subspaces in canonical order.
    #[serde(rename = "virtual")]
    pub virtuals: Vec<Subspace>,
}

/// Validated layout of occupied and virtual orbital subspaces.
///
/// Occupied subspaces come first, followed by virtual ones. This order is the
/// canonical order used to decide which half of a symmetric operator is stored
/// and how the dense matrix of an operator is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MoSpacesConfig", into = "MoSpacesConfig")]
pub struct MoSpaces {
    occupied: Vec<Subspace>,
    virtuals: Vec<Subspace>,
}

impl MoSpaces {
    /// Builds a layout, rejecting empty, duplicated or zero-sized subspaces.
    pub fn new(occupied: Vec<Subspace>, virtuals: Vec<Subspace>) -> Result<Self, OpdmError> {
        if occupied.is_empty() {
            return Err(space_error(
                "no-occupied",
                "layout requires at least one occupied subspace",
            ));
        }
        if virtuals.is_empty() {
            return Err(space_error(
                "no-virtual",
                "layout requires at least one virtual subspace",
            ));
        }
        let mut seen = BTreeSet::new();
        for subspace in occupied.iter().chain(virtuals.iter()) {
            if !seen.insert(subspace.tag.clone()) {
                return Err(OpdmError::Space(
                    ErrorInfo::new("duplicate-tag", "subspace tag appears more than once")
                        .with_context("tag", subspace.tag.as_str()),
                ));
            }
            if subspace.dim == 0 {
                return Err(OpdmError::Space(
                    ErrorInfo::new("empty-subspace", "subspace dimension must be positive")
                        .with_context("tag", subspace.tag.as_str()),
                ));
            }
        }
        Ok(Self { occupied, virtuals })
    }

    /// Convenience constructor from `(tag, dim)` pairs.
    pub fn from_dims(
        occupied: &[(&str, usize)],
        virtuals: &[(&str, usize)],
    ) -> Result<Self, OpdmError> {
        let convert = |pairs: &[(&str, usize)]| -> Result<Vec<Subspace>, OpdmError> {
            pairs
                .iter()
                .map(|(tag, dim)| {
                    Ok(Subspace {
                        tag: SubspaceTag::new(*tag)?,
                        dim: *dim,
                    })
                })
                .collect()
        };
        Self::new(convert(occupied)?, convert(virtuals)?)
    }

    /// Parses a layout from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, OpdmError> {
        serde_json::from_str(json).map_err(|err| {
            OpdmError::Serde(ErrorInfo::new("spaces-json", err.to_string()))
        })
    }

    /// Parses a layout from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, OpdmError> {
        serde_yaml::from_str(yaml).map_err(|err| {
            OpdmError::Serde(ErrorInfo::new("spaces-yaml", err.to_string()))
        })
    }

    /// Loads a layout from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, OpdmError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            OpdmError::Serde(
                ErrorInfo::new("spaces-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(OpdmError::Serde(
                ErrorInfo::new("spaces-format", "unsupported layout file extension")
                    .with_context("path", path.display().to_string())
                    .with_hint("use .json, .yaml or .yml"),
            )),
        }
    }

    /// Occupied subspace tags in canonical order.
    pub fn subspaces_occupied(&self) -> impl Iterator<Item = &SubspaceTag> + '_ {
        self.occupied.iter().map(|s| &s.tag)
    }

    /// Virtual subspace tags in canonical order.
    pub fn subspaces_virtual(&self) -> impl Iterator<Item = &SubspaceTag> + '_ {
        self.virtuals.iter().map(|s| &s.tag)
    }

    /// All subspaces, occupied first.
    pub fn subspaces(&self) -> impl Iterator<Item = &Subspace> + '_ {
        self.occupied.iter().chain(self.virtuals.iter())
    }

    /// Number of subspaces in the layout.
    pub fn n_subspaces(&self) -> usize {
        self.occupied.len() + self.virtuals.len()
    }

    /// Whether the layout contains `tag`.
    pub fn has_subspace(&self, tag: &SubspaceTag) -> bool {
        self.position(tag).is_some()
    }

    /// Canonical position of `tag`, if known.
    pub fn position(&self, tag: &SubspaceTag) -> Option<usize> {
        self.subspaces().position(|s| &s.tag == tag)
    }

    /// Occupied or virtual, if `tag` is known.
    pub fn kind(&self, tag: &SubspaceTag) -> Option<SpaceKind> {
        if self.occupied.iter().any(|s| &s.tag == tag) {
            Some(SpaceKind::Occupied)
        } else if self.virtuals.iter().any(|s| &s.tag == tag) {
            Some(SpaceKind::Virtual)
        } else {
            None
        }
    }

    /// Dimension of the subspace named `tag`.
    pub fn dim(&self, tag: &SubspaceTag) -> Result<usize, OpdmError> {
        self.subspaces()
            .find(|s| &s.tag == tag)
            .map(|s| s.dim)
            .ok_or_else(|| unknown_tag(tag))
    }

    /// Row offset of `tag` inside the full orbital range.
    pub fn offset(&self, tag: &SubspaceTag) -> Result<usize, OpdmError> {
        let mut offset = 0;
        for subspace in self.subspaces() {
            if &subspace.tag == tag {
                return Ok(offset);
            }
            offset += subspace.dim;
        }
        Err(unknown_tag(tag))
    }

    /// Total number of orbitals across all subspaces.
    pub fn n_orbs(&self) -> usize {
        self.subspaces().map(|s| s.dim).sum()
    }
}

fn unknown_tag(tag: &SubspaceTag) -> OpdmError {
    OpdmError::Space(
        ErrorInfo::new("unknown-tag", "subspace is not part of the layout")
            .with_context("tag", tag.as_str()),
    )
}

impl TryFrom<MoSpacesConfig> for MoSpaces {
    type Error = OpdmError;

    fn try_from(config: MoSpacesConfig) -> Result<Self, Self::Error> {
        Self::new(config.occupied, config.virtuals)
    }
}

impl From<MoSpaces> for MoSpacesConfig {
    fn from(spaces: MoSpaces) -> Self {
        Self {
            occupied: spaces.occupied,
            virtuals: spaces.virtuals,
        }
    }
}
