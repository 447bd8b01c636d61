//! Current pose vs. bind pose comparison

use glam::Quat;

use crate::snapshot::{Joint, Transform};

/// How far a joint has moved away from its bind pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseDeviation {
    /// Distance between current and bind translation
    pub translation: f32,
    /// Rotation difference in degrees
    pub rotation_degrees: f32,
}

/// Outcome of comparing one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseCheck {
    /// Within tolerance
    Matches,
    /// Outside tolerance
    Deviates(PoseDeviation),
    /// No bind pose recorded to compare against
    MissingBindPose,
}

/// Translation and rotation tolerances for pose checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseComparator {
    position_tolerance: f32,
    rotation_tolerance: f32,
}

impl PoseComparator {
    /// `rotation_tolerance_degrees` is converted to radians once here
    pub fn new(position_tolerance: f32, rotation_tolerance_degrees: f32) -> Self {
        Self {
            position_tolerance,
            rotation_tolerance: rotation_tolerance_degrees.to_radians(),
        }
    }

    /// Compare a joint's current local transform with its bind pose
    pub fn compare(&self, joint: &Joint) -> PoseCheck {
        match &joint.bind_pose {
            Some(bind) => match self.deviation(&joint.local, bind) {
                Some(deviation) => PoseCheck::Deviates(deviation),
                None => PoseCheck::Matches,
            },
            None => PoseCheck::MissingBindPose,
        }
    }

    /// Difference between two transforms, or `None` when within tolerance
    pub fn deviation(&self, current: &Transform, bind: &Transform) -> Option<PoseDeviation> {
        let translation = current.translation.distance(bind.translation);
        let rotation = rotation_angle(current.rotation, bind.rotation);
        if translation > self.position_tolerance || rotation > self.rotation_tolerance {
            Some(PoseDeviation {
                translation,
                rotation_degrees: rotation.to_degrees(),
            })
        } else {
            None
        }
    }

    /// Angle (degrees) of a stub joint's orientation offset, when it is not
    /// identity within tolerance
    pub fn orient_offset(&self, joint: &Joint) -> Option<f32> {
        let angle = rotation_angle(joint.orient, Quat::IDENTITY);
        (angle > self.rotation_tolerance).then(|| angle.to_degrees())
    }

    pub fn position_tolerance(&self) -> f32 {
        self.position_tolerance
    }
}

/// Smallest angle between two orientations, radians
///
/// atan2 keeps precision near zero, where acos of the dot product does not.
fn rotation_angle(a: Quat, b: Quat) -> f32 {
    let delta = a.normalize().inverse() * b.normalize();
    2.0 * delta.xyz().length().atan2(delta.w.abs())
}
