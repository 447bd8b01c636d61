//! Bind pose and stub orientation

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};
use crate::pose::{PoseCheck, PoseComparator};

/// Bound joints must sit at their bind pose; stub joints must carry no
/// orientation offset.
pub struct BindPoseRule;

impl Rule for BindPoseRule {
    fn id(&self) -> RuleId {
        RuleId::BindPose
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let snapshot = ctx.snapshot;
        let skeleton = snapshot.skeleton();
        let comparator =
            PoseComparator::new(ctx.config.position_tolerance, ctx.config.rotation_tolerance);
        let mut findings = Vec::new();

        for (id, joint) in skeleton.iter() {
            let element = || ElementRef::joint(skeleton, id);

            if snapshot.is_bound(id) {
                match comparator.compare(joint) {
                    PoseCheck::Matches => {}
                    PoseCheck::Deviates(d) => findings.push(
                        Finding::warning(
                            self.id(),
                            format!(
                                "joint {} is not at its bind pose (moved {:.4}, rotated {:.2}°)",
                                joint.name, d.translation, d.rotation_degrees
                            ),
                        )
                        .with_element(element()),
                    ),
                    PoseCheck::MissingBindPose => findings.push(
                        Finding::info(
                            self.id(),
                            format!("joint {} has no recorded bind pose", joint.name),
                        )
                        .with_element(element()),
                    ),
                }
            } else if snapshot.is_stub(id) {
                if let Some(angle) = comparator.orient_offset(joint) {
                    findings.push(
                        Finding::warning(
                            self.id(),
                            format!("stub joint {} has orientation offset of {angle:.2}°", joint.name),
                        )
                        .with_element(element()),
                    );
                }
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RigConfig;
    use crate::finding::Severity;
    use crate::snapshot::{Joint, JointId, Mesh, RigSnapshot, Skeleton, Transform};
    use glam::{Quat, Vec3};

    fn check(joints: Vec<Joint>) -> Vec<Finding> {
        let snapshot =
            RigSnapshot::new(Mesh::default(), Skeleton::new(joints).unwrap(), None).unwrap();
        let config = RigConfig::default();
        BindPoseRule
            .check(&RuleContext {
                snapshot: &snapshot,
                config: &config,
            })
            .unwrap()
    }

    #[test]
    fn test_moved_joint_yields_one_finding() {
        let findings = check(vec![
            Joint::new("root").with_bind_pose(Transform::IDENTITY),
            Joint::new("arm")
                .with_parent(JointId(0))
                .with_local(Transform::from_translation(Vec3::new(0.5, 0.0, 0.0)))
                .with_bind_pose(Transform::IDENTITY),
        ]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].references_joint(JointId(1)));
    }

    #[test]
    fn test_stub_orient_offset() {
        let findings = check(vec![
            Joint::new("root").with_bind_pose(Transform::IDENTITY),
            Joint::new("tip_end")
                .with_parent(JointId(0))
                .with_orient(Quat::from_rotation_z(45f32.to_radians())),
        ]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("stub joint tip_end"));
    }

    #[test]
    fn test_unbound_inner_joint_is_ignored() {
        let findings = check(vec![
            Joint::new("group").with_orient(Quat::from_rotation_z(1.0)),
            Joint::new("leaf").with_parent(JointId(0)),
        ]);
        assert!(findings.is_empty());
    }
}
