//! Immutable rig snapshots
//!
//! A [`RigSnapshot`] bundles the mesh, joint hierarchy and optional skin
//! binding of one validation run. Construction performs every structural
//! check, so rules can index into the data without re-validating it.

mod mesh;
mod skeleton;
mod skin;

pub use mesh::{Face, Mesh};
pub use skeleton::{Joint, JointId, JointLabel, Side, Skeleton, Transform};
pub use skin::{Influence, SkinBinding, VertexWeights, WEIGHT_EPSILON};

use crate::error::{MalformedMeshError, SnapshotError};
use crate::geometry::GeometryIndex;

/// Producer of snapshots (file loaders, host bridges, test fixtures)
pub trait SnapshotSource {
    type Error: From<SnapshotError>;

    fn load(&self) -> Result<RigSnapshot, Self::Error>;
}

/// Validated mesh + skeleton + skin
#[derive(Debug, Clone)]
pub struct RigSnapshot {
    mesh: Mesh,
    skeleton: Skeleton,
    skin: Option<SkinBinding>,
    geometry: GeometryIndex,
    bound: Vec<bool>,
}

impl RigSnapshot {
    pub fn new(
        mesh: Mesh,
        skeleton: Skeleton,
        skin: Option<SkinBinding>,
    ) -> Result<Self, SnapshotError> {
        let geometry = GeometryIndex::build(&mesh)?;

        if let Some(tweaks) = mesh.tweaks() {
            if tweaks.len() != mesh.vertex_count() {
                return Err(MalformedMeshError::TweakCountMismatch {
                    vertex_count: mesh.vertex_count(),
                    tweak_count: tweaks.len(),
                }
                .into());
            }
        }

        let mut bound: Vec<bool> = skeleton
            .joints()
            .iter()
            .map(|j| j.bind_pose.is_some())
            .collect();

        if let Some(skin) = &skin {
            validate_skin(skin, &mesh, &skeleton)?;
            for (slot, used) in bound
                .iter_mut()
                .zip(skin.influencing_joints(skeleton.len()))
            {
                *slot |= used;
            }
        }

        tracing::debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            joints = skeleton.len(),
            skinned = skin.is_some(),
            "snapshot validated"
        );

        Ok(Self {
            mesh,
            skeleton,
            skin,
            geometry,
            bound,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skin(&self) -> Option<&SkinBinding> {
        self.skin.as_ref()
    }

    pub fn geometry(&self) -> &GeometryIndex {
        &self.geometry
    }

    /// A joint is bound when it has a recorded bind pose or carries weight
    pub fn is_bound(&self, joint: JointId) -> bool {
        self.bound[joint.0]
    }

    /// Unbound leaf joints
    pub fn is_stub(&self, joint: JointId) -> bool {
        !self.is_bound(joint) && self.skeleton.is_leaf(joint)
    }
}

fn validate_skin(
    skin: &SkinBinding,
    mesh: &Mesh,
    skeleton: &Skeleton,
) -> Result<(), SnapshotError> {
    if skin.vertex_count() != mesh.vertex_count() {
        return Err(SnapshotError::SkinVertexMismatch {
            skin_vertices: skin.vertex_count(),
            mesh_vertices: mesh.vertex_count(),
        });
    }

    for (vertex, influences) in skin.iter() {
        for influence in influences {
            if influence.joint.0 >= skeleton.len() {
                return Err(SnapshotError::UnknownInfluence {
                    vertex,
                    joint: influence.joint.0,
                });
            }
            if !influence.weight.is_finite() || influence.weight < 0.0 {
                return Err(SnapshotError::InvalidWeight {
                    vertex,
                    joint: influence.joint.0,
                    weight: influence.weight,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use smallvec::smallvec;

    fn triangle() -> Mesh {
        Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]])
    }

    fn two_joints() -> Skeleton {
        Skeleton::new(vec![
            Joint::new("root"),
            Joint::new("tip").with_parent(JointId(0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_dangling_face_index_is_fatal() {
        let mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 7]]);
        let err = RigSnapshot::new(mesh, Skeleton::default(), None).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::MalformedMesh(MalformedMeshError::IndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn test_tweak_mismatch_is_fatal() {
        let mesh = triangle().with_tweaks(vec![Vec3::ZERO]);
        assert!(matches!(
            RigSnapshot::new(mesh, Skeleton::default(), None),
            Err(SnapshotError::MalformedMesh(
                MalformedMeshError::TweakCountMismatch { .. }
            ))
        ));
    }

    #[test]
    fn test_skin_vertex_mismatch_is_fatal() {
        let skin = SkinBinding::new(vec![smallvec![Influence::new(JointId(0), 1.0)]]);
        assert!(matches!(
            RigSnapshot::new(triangle(), two_joints(), Some(skin)),
            Err(SnapshotError::SkinVertexMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_influence_is_fatal() {
        let skin = SkinBinding::new(vec![
            smallvec![Influence::new(JointId(0), 1.0)],
            smallvec![Influence::new(JointId(9), 1.0)],
            smallvec![Influence::new(JointId(0), 1.0)],
        ]);
        assert!(matches!(
            RigSnapshot::new(triangle(), two_joints(), Some(skin)),
            Err(SnapshotError::UnknownInfluence { vertex: 1, joint: 9 })
        ));
    }

    #[test]
    fn test_negative_weight_is_fatal() {
        let skin = SkinBinding::new(vec![
            smallvec![Influence::new(JointId(0), -0.5)],
            smallvec![],
            smallvec![],
        ]);
        assert!(matches!(
            RigSnapshot::new(triangle(), two_joints(), Some(skin)),
            Err(SnapshotError::InvalidWeight { vertex: 0, .. })
        ));
    }

    #[test]
    fn test_bound_and_stub_joints() {
        let skin = SkinBinding::new(vec![
            smallvec![Influence::new(JointId(0), 1.0)],
            smallvec![Influence::new(JointId(0), 1.0)],
            smallvec![Influence::new(JointId(0), 1.0)],
        ]);
        let snapshot = RigSnapshot::new(triangle(), two_joints(), Some(skin)).unwrap();
        assert!(snapshot.is_bound(JointId(0)));
        assert!(!snapshot.is_bound(JointId(1)));
        assert!(snapshot.is_stub(JointId(1)));
        assert!(!snapshot.is_stub(JointId(0)));
    }
}
