//! Raw mesh data

use glam::Vec3;
use smallvec::SmallVec;

/// One polygon as an ordered list of vertex indices
///
/// Most character meshes are quads and triangles, so four corners are stored
/// inline.
pub type Face = SmallVec<[u32; 4]>;

/// Vertex positions, polygon faces and optional per-vertex tweaks
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    positions: Vec<Vec3>,
    faces: Vec<Face>,
    tweaks: Option<Vec<Vec3>>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            positions,
            faces,
            tweaks: None,
        }
    }

    /// Build a mesh from triangle index triplets
    pub fn from_triangles(positions: Vec<Vec3>, triangles: &[[u32; 3]]) -> Self {
        let faces = triangles.iter().map(|t| Face::from_slice(t)).collect();
        Self::new(positions, faces)
    }

    /// Attach per-vertex tweak offsets
    pub fn with_tweaks(mut self, tweaks: Vec<Vec3>) -> Self {
        self.tweaks = Some(tweaks);
        self
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn position(&self, vertex: u32) -> Vec3 {
        self.positions[vertex as usize]
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Tweak offsets, if the source recorded any
    pub fn tweaks(&self) -> Option<&[Vec3]> {
        self.tweaks.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}
