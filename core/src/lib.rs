//! Rigcheck Core - consistency checks for skinned character rigs
//!
//! Validates a mesh, its joint hierarchy and skin weights before export.
//!
//! # Architecture
//!
//! - [`RigSnapshot`] - Immutable mesh + skeleton + skin, structurally validated
//! - [`GeometryIndex`] - Edge/face adjacency used by topology checks
//! - [`symmetry`] - Left/right joint pairing and mirrored vertex lookup
//! - [`PoseComparator`] - Current pose vs. bind pose
//! - [`RuleEngine`] - Runs independent [`Rule`]s and builds a [`Report`]

pub mod config;
pub mod error;
pub mod finding;
pub mod geometry;
pub mod pose;
pub mod report;
pub mod rules;
pub mod snapshot;
pub mod symmetry;

pub use config::RigConfig;
pub use error::{ConfigError, MalformedMeshError, SnapshotError, ValidationError};
pub use finding::{ElementRef, Finding, Severity};
pub use geometry::{Edge, GeometryIndex};
pub use pose::{PoseCheck, PoseComparator, PoseDeviation};
pub use report::{FindingGroup, Report, RigStats};
pub use rules::{Rule, RuleContext, RuleEngine, RuleId, RuleSkipped};
pub use snapshot::{
    Influence, Joint, JointId, JointLabel, Mesh, RigSnapshot, Side, Skeleton, SkinBinding,
    SnapshotSource, Transform, VertexWeights, WEIGHT_EPSILON,
};
pub use symmetry::SymmetryPlane;

/// Validate a rig with the built-in rules
///
/// Structural problems (bad indices, broken hierarchy, invalid weights) and
/// bad configuration abort with an error; everything else becomes a finding.
pub fn check_rig(
    mesh: Mesh,
    skeleton: Skeleton,
    skin: Option<SkinBinding>,
    config: &RigConfig,
) -> Result<Report, ValidationError> {
    let snapshot = RigSnapshot::new(mesh, skeleton, skin)?;
    Ok(RuleEngine::with_default_rules().run(&snapshot, config)?)
}
