//! Structural error types
//!
//! These abort a validation run. Rule violations are never errors; they are
//! reported as [`Finding`](crate::Finding)s instead.

use thiserror::Error;

/// Mesh data that cannot be indexed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedMeshError {
    /// A face references a vertex that does not exist
    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A face with fewer than three corners
    #[error("face {face} has {count} vertices (need at least 3)")]
    TooFewVertices { face: usize, count: usize },

    /// A vertex position containing NaN or infinity
    #[error("vertex {vertex} has a non-finite position")]
    NonFinitePosition { vertex: u32 },

    /// Tweak array does not line up with the vertex array
    #[error("mesh has {vertex_count} vertices but {tweak_count} tweaks")]
    TweakCountMismatch {
        vertex_count: usize,
        tweak_count: usize,
    },
}

/// Any structural problem with a snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("malformed mesh: {0}")]
    MalformedMesh(#[from] MalformedMeshError),

    /// Two joints with the same name
    #[error("duplicate joint name '{0}'")]
    DuplicateJointName(String),

    /// Parent index points outside the skeleton
    #[error("joint '{joint}' has parent index {parent} but the skeleton has {joint_count} joints")]
    DanglingParent {
        joint: String,
        parent: usize,
        joint_count: usize,
    },

    /// Parent chain loops back on itself
    #[error("joint hierarchy contains a cycle through '{0}'")]
    HierarchyCycle(String),

    /// A joint transform containing NaN or infinity
    #[error("joint '{0}' has a non-finite transform")]
    NonFiniteTransform(String),

    /// A rotation or orient quaternion too short to normalize
    #[error("joint '{0}' has a zero-length rotation")]
    DegenerateRotation(String),

    /// Skin has a different vertex count than the mesh
    #[error("skin binding covers {skin_vertices} vertices but the mesh has {mesh_vertices}")]
    SkinVertexMismatch {
        skin_vertices: usize,
        mesh_vertices: usize,
    },

    /// Influence references a joint index outside the skeleton
    #[error("vertex {vertex} is weighted to joint index {joint} which does not exist")]
    UnknownInfluence { vertex: u32, joint: usize },

    /// Negative or non-finite weight value
    #[error("vertex {vertex} has invalid weight {weight} for joint index {joint}")]
    InvalidWeight { vertex: u32, joint: usize, weight: f32 },
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidTolerance { name: &'static str, value: f32 },
}

/// Anything that stops a validation run before rules are evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
