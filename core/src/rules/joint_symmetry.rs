//! Joint symmetry

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};
use crate::snapshot::Side;
use crate::symmetry::pair_joints;

/// Left/right joints need a partner of the same kind, positioned as its
/// mirror image in world space.
pub struct JointSymmetryRule;

impl Rule for JointSymmetryRule {
    fn id(&self) -> RuleId {
        RuleId::JointSymmetry
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let skeleton = ctx.snapshot.skeleton();
        let plane = ctx.config.symmetry_plane;
        let tolerance = ctx.config.position_tolerance;
        let pairing = pair_joints(skeleton);
        let mut findings = Vec::new();

        for id in pairing.unmatched {
            let joint = skeleton.joint(id);
            let side = joint.label.side;
            let expected = match side.opposite() {
                Side::Left => "left",
                _ => "right",
            };
            findings.push(
                Finding::warning(
                    self.id(),
                    format!(
                        "unmatched joint: {} has no {expected} counterpart of type '{}'",
                        joint.name,
                        joint.label.kind.as_deref().unwrap_or_default()
                    ),
                )
                .with_element(ElementRef::joint(skeleton, id)),
            );
        }

        for (left, right) in pairing.pairs {
            let mirrored = plane.mirror(skeleton.world_position(left));
            let distance = mirrored.distance(skeleton.world_position(right));
            if distance > tolerance {
                findings.push(
                    Finding::warning(
                        self.id(),
                        format!(
                            "joints {} and {} are not mirror images ({distance:.4} apart)",
                            skeleton.joint(left).name,
                            skeleton.joint(right).name
                        ),
                    )
                    .with_element(ElementRef::joint(skeleton, left))
                    .with_element(ElementRef::joint(skeleton, right)),
                );
            }
        }

        Ok(findings)
    }
}
