//! Influence count per vertex

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};
use crate::snapshot::WEIGHT_EPSILON;

/// Vertices weighted to more joints than `max_influences` allows
pub struct MaxInfluencesRule;

impl Rule for MaxInfluencesRule {
    fn id(&self) -> RuleId {
        RuleId::MaxInfluences
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let max = ctx.config.max_influences as usize;
        if max == 0 {
            return Ok(Vec::new());
        }
        let skin = ctx
            .snapshot
            .skin()
            .ok_or_else(|| RuleSkipped("mesh has no skin binding".into()))?;
        let skeleton = ctx.snapshot.skeleton();

        let mut findings = Vec::new();
        for (vertex, influences) in skin.iter() {
            let count = skin.influence_count(vertex);
            if count <= max {
                continue;
            }
            findings.push(
                Finding::error(
                    self.id(),
                    format!("vertex {vertex} has {count} influences (max {max})"),
                )
                .with_element(ElementRef::vertex(vertex))
                .with_elements(
                    influences
                        .iter()
                        .filter(|i| i.weight > WEIGHT_EPSILON)
                        .map(|i| ElementRef::joint(skeleton, i.joint)),
                ),
            );
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RigConfig;
    use crate::snapshot::{
        Influence, Joint, JointId, Mesh, RigSnapshot, Skeleton, SkinBinding, VertexWeights,
    };
    use glam::Vec3;

    fn five_way_snapshot() -> RigSnapshot {
        let joints = (0..5).map(|i| Joint::new(format!("j{i}"))).collect();
        let five: VertexWeights = (0..5).map(|i| Influence::new(JointId(i), 0.2)).collect();
        let one: VertexWeights = std::iter::once(Influence::new(JointId(0), 1.0)).collect();
        let skin = SkinBinding::new(vec![five, one.clone(), one]);
        RigSnapshot::new(
            Mesh::from_triangles(vec![Vec3::X, Vec3::Y, Vec3::Z], &[[0, 1, 2]]),
            Skeleton::new(joints).unwrap(),
            Some(skin),
        )
        .unwrap()
    }

    fn check(snapshot: &RigSnapshot, max_influences: u32) -> Result<Vec<Finding>, RuleSkipped> {
        let config = RigConfig {
            max_influences,
            ..RigConfig::default()
        };
        MaxInfluencesRule.check(&RuleContext {
            snapshot,
            config: &config,
        })
    }

    #[test]
    fn test_five_influences_flagged_at_four() {
        let findings = check(&five_way_snapshot(), 4).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "vertex 0 has 5 influences (max 4)");
        assert_eq!(findings[0].elements.len(), 6);
    }

    #[test]
    fn test_disabled_at_zero() {
        assert!(check(&five_way_snapshot(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_no_skin_skips() {
        let snapshot = RigSnapshot::new(
            Mesh::from_triangles(vec![Vec3::X, Vec3::Y, Vec3::Z], &[[0, 1, 2]]),
            Skeleton::default(),
            None,
        )
        .unwrap();
        assert!(check(&snapshot, 4).is_err());
    }
}
