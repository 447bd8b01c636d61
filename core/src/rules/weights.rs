//! Weight normalization

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};

/// Weights on each vertex must sum to one; vertices without weights are
/// reported separately.
pub struct WeightNormalizationRule;

impl Rule for WeightNormalizationRule {
    fn id(&self) -> RuleId {
        RuleId::WeightNormalization
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let skin = ctx
            .snapshot
            .skin()
            .ok_or_else(|| RuleSkipped("mesh has no skin binding".into()))?;
        let tolerance = ctx.config.weight_sum_tolerance;

        let mut findings = Vec::new();
        for (vertex, _) in skin.iter() {
            if skin.influence_count(vertex) == 0 {
                findings.push(
                    Finding::warning(self.id(), format!("vertex {vertex} has no skin weights"))
                        .with_element(ElementRef::vertex(vertex)),
                );
                continue;
            }
            let sum = skin.weight_sum(vertex);
            if (sum - 1.0).abs() > tolerance {
                findings.push(
                    Finding::error(
                        self.id(),
                        format!("vertex {vertex} weights sum to {sum:.4}"),
                    )
                    .with_element(ElementRef::vertex(vertex)),
                );
            }
        }
        Ok(findings)
    }
}
