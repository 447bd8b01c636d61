//! Joint hierarchy with labels, current pose and bind pose

use glam::{Mat4, Quat, Vec3};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// Index of a joint inside its [`Skeleton`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JointId(pub usize);

/// Which side of the character a joint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Center,
    #[default]
    None,
}

impl Side {
    /// The side a mirrored joint is expected on
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            other => other,
        }
    }
}

/// Side plus joint type ("arm", "knee", ...)
///
/// Left/Right pairs share a kind; every other (side, kind) combination is
/// expected to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JointLabel {
    pub side: Side,
    pub kind: Option<String>,
}

impl JointLabel {
    pub fn new(side: Side, kind: impl Into<String>) -> Self {
        Self {
            side,
            kind: Some(kind.into()),
        }
    }

    pub fn unlabeled() -> Self {
        Self::default()
    }

    /// True when both the side and the kind are set
    pub fn is_labeled(&self) -> bool {
        self.side != Side::None && self.kind.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Translation, rotation and scale in the parent's space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Decompose an affine matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation.normalize(),
            self.translation,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Rotation long enough to normalize
    pub fn has_valid_rotation(&self) -> bool {
        is_valid_rotation(self.rotation)
    }
}

/// Quaternions shorter than this cannot be normalized into a rotation
pub const MIN_ROTATION_LENGTH: f32 = 1e-6;

fn is_valid_rotation(q: Quat) -> bool {
    q.length() > MIN_ROTATION_LENGTH
}

/// One joint of the hierarchy
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub label: JointLabel,
    pub parent: Option<JointId>,
    /// Current local transform
    pub local: Transform,
    /// Local transform recorded when the skin was bound
    pub bind_pose: Option<Transform>,
    /// Orientation offset applied before `local.rotation`
    pub orient: Quat,
}

impl Joint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: JointLabel::unlabeled(),
            parent: None,
            local: Transform::IDENTITY,
            bind_pose: None,
            orient: Quat::IDENTITY,
        }
    }

    pub fn with_parent(mut self, parent: JointId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_label(mut self, label: JointLabel) -> Self {
        self.label = label;
        self
    }

    pub fn with_local(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_bind_pose(mut self, bind_pose: Transform) -> Self {
        self.bind_pose = Some(bind_pose);
        self
    }

    pub fn with_orient(mut self, orient: Quat) -> Self {
        self.orient = orient;
        self
    }

    /// Local matrix including the orientation offset
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.local.scale,
            (self.orient.normalize() * self.local.rotation.normalize()).normalize(),
            self.local.translation,
        )
    }

    fn is_finite(&self) -> bool {
        self.local.is_finite()
            && self.orient.is_finite()
            && self.bind_pose.is_none_or(|b| b.is_finite())
    }

    fn has_valid_rotations(&self) -> bool {
        self.local.has_valid_rotation()
            && is_valid_rotation(self.orient)
            && self.bind_pose.is_none_or(|b| b.has_valid_rotation())
    }
}

/// Validated joint hierarchy
///
/// Parent references are checked for range and cycles on construction, and
/// world matrices of the current pose are cached.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<Joint>,
    children: Vec<Vec<JointId>>,
    world: Vec<Mat4>,
}

impl Skeleton {
    pub fn new(joints: Vec<Joint>) -> Result<Self, SnapshotError> {
        let count = joints.len();

        {
            let mut names = HashSet::with_capacity(count);
            for joint in &joints {
                if !names.insert(joint.name.as_str()) {
                    return Err(SnapshotError::DuplicateJointName(joint.name.clone()));
                }
                if !joint.is_finite() {
                    return Err(SnapshotError::NonFiniteTransform(joint.name.clone()));
                }
                if !joint.has_valid_rotations() {
                    return Err(SnapshotError::DegenerateRotation(joint.name.clone()));
                }
                if let Some(parent) = joint.parent {
                    if parent.0 >= count {
                        return Err(SnapshotError::DanglingParent {
                            joint: joint.name.clone(),
                            parent: parent.0,
                            joint_count: count,
                        });
                    }
                }
            }
        }

        let mut children = vec![Vec::new(); count];
        for (index, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                children[parent.0].push(JointId(index));
            }
        }

        let world = compute_world_matrices(&joints)?;

        Ok(Self {
            joints,
            children,
            world,
        })
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joint(&self, id: JointId) -> &Joint {
        &self.joints[id.0]
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Joint)> + '_ {
        self.joints
            .iter()
            .enumerate()
            .map(|(index, joint)| (JointId(index), joint))
    }

    /// Look up a joint by name
    pub fn find(&self, name: &str) -> Option<JointId> {
        self.joints
            .iter()
            .position(|j| j.name == name)
            .map(JointId)
    }

    pub fn children(&self, id: JointId) -> &[JointId] {
        &self.children[id.0]
    }

    pub fn is_leaf(&self, id: JointId) -> bool {
        self.children[id.0].is_empty()
    }

    /// World matrix of the current pose
    pub fn world_matrix(&self, id: JointId) -> Mat4 {
        self.world[id.0]
    }

    pub fn world_position(&self, id: JointId) -> Vec3 {
        self.world[id.0].w_axis.truncate()
    }
}

/// Walk each parent chain once, caching results; a chain longer than the
/// skeleton means the hierarchy loops.
fn compute_world_matrices(joints: &[Joint]) -> Result<Vec<Mat4>, SnapshotError> {
    let count = joints.len();
    let mut world: Vec<Option<Mat4>> = vec![None; count];
    let mut chain = Vec::new();

    for start in 0..count {
        chain.clear();
        let mut cursor = Some(start);
        while let Some(index) = cursor {
            if world[index].is_some() {
                break;
            }
            if chain.len() >= count {
                return Err(SnapshotError::HierarchyCycle(joints[start].name.clone()));
            }
            chain.push(index);
            cursor = joints[index].parent.map(|p| p.0);
        }

        let mut accumulated = cursor.and_then(|i| world[i]).unwrap_or(Mat4::IDENTITY);
        for &index in chain.iter().rev() {
            accumulated *= joints[index].local_matrix();
            world[index] = Some(accumulated);
        }
    }

    Ok(world.into_iter().map(|m| m.unwrap_or(Mat4::IDENTITY)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Joint> {
        vec![
            Joint::new("root"),
            Joint::new("spine")
                .with_parent(JointId(0))
                .with_local(Transform::from_translation(Vec3::Y)),
            Joint::new("head")
                .with_parent(JointId(1))
                .with_local(Transform::from_translation(Vec3::Y)),
        ]
    }

    #[test]
    fn test_world_positions_accumulate() {
        let skeleton = Skeleton::new(chain()).unwrap();
        assert_eq!(skeleton.world_position(JointId(2)), Vec3::new(0.0, 2.0, 0.0));
        assert!(skeleton.is_leaf(JointId(2)));
        assert_eq!(skeleton.children(JointId(0)), &[JointId(1)]);
    }

    #[test]
    fn test_parent_listed_after_child() {
        let joints = vec![
            Joint::new("hand")
                .with_parent(JointId(1))
                .with_local(Transform::from_translation(Vec3::X)),
            Joint::new("arm").with_local(Transform::from_translation(Vec3::X)),
        ];
        let skeleton = Skeleton::new(joints).unwrap();
        assert_eq!(skeleton.world_position(JointId(0)), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let joints = vec![Joint::new("a"), Joint::new("a")];
        assert_eq!(
            Skeleton::new(joints).unwrap_err(),
            SnapshotError::DuplicateJointName("a".into())
        );
    }

    #[test]
    fn test_dangling_parent_rejected() {
        let joints = vec![Joint::new("a").with_parent(JointId(5))];
        assert!(matches!(
            Skeleton::new(joints),
            Err(SnapshotError::DanglingParent { parent: 5, .. })
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let joints = vec![
            Joint::new("a").with_parent(JointId(1)),
            Joint::new("b").with_parent(JointId(0)),
        ];
        assert!(matches!(
            Skeleton::new(joints),
            Err(SnapshotError::HierarchyCycle(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let joints =
            vec![Joint::new("a").with_local(Transform::from_translation(Vec3::splat(f32::NAN)))];
        assert!(matches!(
            Skeleton::new(joints),
            Err(SnapshotError::NonFiniteTransform(_))
        ));
    }

    #[test]
    fn test_zero_length_rotation_rejected() {
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        let joints = vec![
            Joint::new("a")
                .with_local(Transform::new(Vec3::ZERO, zero, Vec3::ONE))
                .with_bind_pose(Transform::IDENTITY),
        ];
        assert_eq!(
            Skeleton::new(joints).unwrap_err(),
            SnapshotError::DegenerateRotation("a".into())
        );

        let joints = vec![Joint::new("root"), Joint::new("tip").with_parent(JointId(0)).with_orient(zero)];
        assert_eq!(
            Skeleton::new(joints).unwrap_err(),
            SnapshotError::DegenerateRotation("tip".into())
        );

        let joints = vec![Joint::new("b").with_bind_pose(Transform::new(Vec3::ZERO, zero, Vec3::ONE))];
        assert!(matches!(
            Skeleton::new(joints),
            Err(SnapshotError::DegenerateRotation(_))
        ));
    }

    #[test]
    fn test_unnormalized_rotation_accepted() {
        let joints = vec![Joint::new("a").with_local(Transform::new(
            Vec3::ZERO,
            Quat::from_xyzw(0.0, 0.0, 0.0, 2.0),
            Vec3::ONE,
        ))];
        let skeleton = Skeleton::new(joints).unwrap();
        assert!(skeleton.world_matrix(JointId(0)).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_find_by_name() {
        let skeleton = Skeleton::new(chain()).unwrap();
        assert_eq!(skeleton.find("spine"), Some(JointId(1)));
        assert_eq!(skeleton.find("tail"), None);
    }

    #[test]
    fn test_label_is_labeled() {
        assert!(JointLabel::new(Side::Left, "arm").is_labeled());
        assert!(!JointLabel::new(Side::None, "arm").is_labeled());
        assert!(!JointLabel::unlabeled().is_labeled());
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Center.opposite(), Side::Center);
    }

    #[test]
    fn test_transform_matrix_roundtrip() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.5),
            Vec3::ONE,
        );
        let back = Transform::from_matrix(t.to_matrix());
        assert!(back.translation.abs_diff_eq(t.translation, 1e-5));
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
    }
}
