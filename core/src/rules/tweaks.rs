//! Leftover vertex tweaks

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};

/// Vertices whose tweak offset is longer than the position tolerance
pub struct TweaksRule;

impl Rule for TweaksRule {
    fn id(&self) -> RuleId {
        RuleId::Tweaks
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let tweaks = ctx
            .snapshot
            .mesh()
            .tweaks()
            .ok_or_else(|| RuleSkipped("mesh has no tweak data".into()))?;
        let tolerance = ctx.config.position_tolerance;

        Ok(tweaks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.length() > tolerance)
            .map(|(vertex, t)| {
                Finding::warning(
                    self.id(),
                    format!(
                        "vertex {vertex} has a tweak of ({:.4}, {:.4}, {:.4})",
                        t.x, t.y, t.z
                    ),
                )
                .with_element(ElementRef::vertex(vertex as u32))
            })
            .collect())
    }
}
