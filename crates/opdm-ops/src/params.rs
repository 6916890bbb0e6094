use opdm_core::{DEFAULT_SYMMETRY_TOLERANCE, TOTALLY_SYMMETRIC};
use serde::{Deserialize, Serialize};

/// Options controlling how a one-particle operator is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorOpts {
    /// Whether transpose-partner blocks are related by transposition.
    #[serde(default = "default_symmetric")]
    pub is_symmetric: bool,
    /// Cartesian transform descriptor recorded on every block.
    #[serde(default = "default_transform")]
    pub cartesian_transform: String,
    /// Absolute tolerance used when validating symmetric diagonal blocks.
    #[serde(default = "default_tolerance")]
    pub symmetry_tolerance: f64,
}

fn default_symmetric() -> bool {
    true
}

fn default_transform() -> String {
    TOTALLY_SYMMETRIC.to_string()
}

fn default_tolerance() -> f64 {
    DEFAULT_SYMMETRY_TOLERANCE
}

impl Default for OperatorOpts {
    fn default() -> Self {
        Self {
            is_symmetric: default_symmetric(),
            cartesian_transform: default_transform(),
            symmetry_tolerance: default_tolerance(),
        }
    }
}

impl OperatorOpts {
    /// Symmetric, totally symmetric operator (the default).
    pub fn symmetric() -> Self {
        Self::default()
    }

    /// Operator storing every block explicitly.
    pub fn asymmetric() -> Self {
        Self {
            is_symmetric: false,
            ..Self::default()
        }
    }

    /// Returns a copy with the given cartesian transform.
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.cartesian_transform = transform.into();
        self
    }

    /// Ensures the tolerance is finite and non-negative.
    pub fn sanitised(&self) -> Self {
        let symmetry_tolerance = if self.symmetry_tolerance.is_finite() {
            self.symmetry_tolerance.max(0.0)
        } else {
            default_tolerance()
        };
        Self {
            is_symmetric: self.is_symmetric,
            cartesian_transform: self.cartesian_transform.clone(),
            symmetry_tolerance,
        }
    }
}
