//! Validation options
//!
//! Every field has a default, so partial TOML/JSON documents deserialize.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::RuleId;
use crate::symmetry::SymmetryPlane;

/// Options shared by all rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RigConfig {
    /// Maximum joints influencing one vertex. 0 disables the check.
    /// Default: 4
    pub max_influences: u32,

    /// Plane used for mesh and joint symmetry.
    /// Default: yz (mirror across X)
    pub symmetry_plane: SymmetryPlane,

    /// Distance below which positions are considered equal (scene units).
    /// Default: 0.001
    pub position_tolerance: f32,

    /// Angle below which rotations are considered equal (degrees).
    /// Default: 0.1
    pub rotation_tolerance: f32,

    /// Allowed difference between a vertex's weight sum and 1.0.
    /// Default: 0.001
    pub weight_sum_tolerance: f32,

    /// Mesh symmetry is skipped above this vertex count.
    /// Default: 1_000_000
    pub symmetry_vertex_limit: usize,

    /// Report open (boundary) edges as informational findings.
    /// Default: false
    pub report_boundary_edges: bool,

    /// Rules that should not run.
    pub disabled_rules: Vec<RuleId>,

    /// Evaluate rules on the rayon thread pool.
    /// Default: false
    pub parallel: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            max_influences: 4,
            symmetry_plane: SymmetryPlane::Yz,
            position_tolerance: 0.001,
            rotation_tolerance: 0.1,
            weight_sum_tolerance: 0.001,
            symmetry_vertex_limit: 1_000_000,
            report_boundary_edges: false,
            disabled_rules: Vec::new(),
            parallel: false,
        }
    }
}

impl RigConfig {
    /// Reject negative or non-finite tolerances
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("position_tolerance", self.position_tolerance),
            ("rotation_tolerance", self.rotation_tolerance),
            ("weight_sum_tolerance", self.weight_sum_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        !self.disabled_rules.contains(&rule)
    }
}
