//! Joint label consistency

use super::{Rule, RuleContext, RuleId, RuleSkipped};
use crate::finding::{ElementRef, Finding};
use crate::symmetry::pair_joints;

pub struct LabelsRule;

impl Rule for LabelsRule {
    fn id(&self) -> RuleId {
        RuleId::Labels
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped> {
        let skeleton = ctx.snapshot.skeleton();
        let mut findings = Vec::new();

        for duplicate in pair_joints(skeleton).duplicates {
            let names: Vec<&str> = duplicate
                .joints
                .iter()
                .map(|&id| skeleton.joint(id).name.as_str())
                .collect();
            findings.push(
                Finding::error(
                    self.id(),
                    format!(
                        "duplicate label {:?} '{}' on joints: {}",
                        duplicate.side,
                        duplicate.kind,
                        names.join(", ")
                    ),
                )
                .with_elements(
                    duplicate
                        .joints
                        .iter()
                        .map(|&id| ElementRef::joint(skeleton, id)),
                ),
            );
        }

        for (id, joint) in skeleton.iter() {
            if !joint.label.is_labeled() {
                findings.push(
                    Finding::warning(self.id(), format!("unlabeled joint: {}", joint.name))
                        .with_element(ElementRef::joint(skeleton, id)),
                );
            }
        }

        Ok(findings)
    }
}
