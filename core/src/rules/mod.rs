//! Rule engine
//!
//! Each rule is a pure function over an immutable [`RigSnapshot`]. Rules run
//! in the fixed order of [`RuleId`]; their findings are concatenated in that
//! order, so sequential and parallel runs produce the same report.
//!
//! A rule that cannot evaluate (missing optional data, size limits) returns
//! [`RuleSkipped`]; the engine records that as an `Info` finding and carries
//! on with the remaining rules.

mod bind_pose;
mod influences;
mod joint_symmetry;
mod labels;
mod manifold;
mod mesh_symmetry;
mod tweaks;
mod weights;

pub use bind_pose::BindPoseRule;
pub use influences::MaxInfluencesRule;
pub use joint_symmetry::JointSymmetryRule;
pub use labels::LabelsRule;
pub use manifold::ManifoldRule;
pub use mesh_symmetry::MeshSymmetryRule;
pub use tweaks::TweaksRule;
pub use weights::WeightNormalizationRule;

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RigConfig;
use crate::error::ConfigError;
use crate::finding::Finding;
use crate::report::{Report, RigStats};
use crate::snapshot::RigSnapshot;

/// Rule identifiers, in evaluation order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    Manifold,
    Tweaks,
    MeshSymmetry,
    JointSymmetry,
    MaxInfluences,
    WeightNormalization,
    Labels,
    BindPose,
}

impl RuleId {
    pub const ALL: [RuleId; 8] = [
        RuleId::Manifold,
        RuleId::Tweaks,
        RuleId::MeshSymmetry,
        RuleId::JointSymmetry,
        RuleId::MaxInfluences,
        RuleId::WeightNormalization,
        RuleId::Labels,
        RuleId::BindPose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::Manifold => "manifold",
            RuleId::Tweaks => "tweaks",
            RuleId::MeshSymmetry => "mesh-symmetry",
            RuleId::JointSymmetry => "joint-symmetry",
            RuleId::MaxInfluences => "max-influences",
            RuleId::WeightNormalization => "weight-normalization",
            RuleId::Labels => "labels",
            RuleId::BindPose => "bind-pose",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RuleId::Manifold => "edges shared by more than two faces, bowtie vertices, degenerate faces",
            RuleId::Tweaks => "vertices carrying leftover tweak offsets",
            RuleId::MeshSymmetry => "vertices without a mirrored counterpart",
            RuleId::JointSymmetry => "left/right joints without a partner or out of mirror position",
            RuleId::MaxInfluences => "vertices weighted to more joints than allowed",
            RuleId::WeightNormalization => "vertices whose weights do not sum to one",
            RuleId::Labels => "duplicate or missing joint labels",
            RuleId::BindPose => "joints moved away from the bind pose, stub joint orientation",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown rule '{s}'"))
    }
}

/// Why a rule could not evaluate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct RuleSkipped(pub String);

/// Inputs every rule receives
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub snapshot: &'a RigSnapshot,
    pub config: &'a RigConfig,
}

/// A single independent check
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleSkipped>;
}

/// Ordered collection of rules
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl RuleEngine {
    /// Engine with no rules registered
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Engine with every built-in rule, in [`RuleId`] order
    pub fn with_default_rules() -> Self {
        let mut engine = Self::empty();
        engine.add_rule(ManifoldRule);
        engine.add_rule(TweaksRule);
        engine.add_rule(MeshSymmetryRule);
        engine.add_rule(JointSymmetryRule);
        engine.add_rule(MaxInfluencesRule);
        engine.add_rule(WeightNormalizationRule);
        engine.add_rule(LabelsRule);
        engine.add_rule(BindPoseRule);
        engine
    }

    pub fn add_rule(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.iter().map(|r| r.id())
    }

    /// Run all enabled rules and build the report
    pub fn run(&self, snapshot: &RigSnapshot, config: &RigConfig) -> Result<Report, ConfigError> {
        config.validate()?;

        let ctx = RuleContext { snapshot, config };
        let active: Vec<&dyn Rule> = self
            .rules
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| config.is_enabled(r.id()))
            .collect();

        let per_rule: Vec<Vec<Finding>> = if config.parallel {
            active.par_iter().map(|rule| evaluate(*rule, &ctx)).collect()
        } else {
            active.iter().map(|rule| evaluate(*rule, &ctx)).collect()
        };

        let findings: Vec<Finding> = per_rule.into_iter().flatten().collect();
        let report = Report::build(RigStats::of(snapshot), findings);

        tracing::info!(
            errors = report.errors(),
            warnings = report.warnings(),
            infos = report.infos(),
            rules = active.len(),
            "rig check finished"
        );

        Ok(report)
    }
}

fn evaluate(rule: &dyn Rule, ctx: &RuleContext<'_>) -> Vec<Finding> {
    let id = rule.id();
    match rule.check(ctx) {
        Ok(findings) => {
            tracing::debug!(rule = %id, findings = findings.len(), "rule evaluated");
            findings
        }
        Err(skipped) => {
            tracing::debug!(rule = %id, reason = %skipped, "rule skipped");
            vec![Finding::info(id, format!("rule skipped: {skipped}"))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_id_roundtrip() {
        for id in RuleId::ALL {
            assert_eq!(id.as_str().parse::<RuleId>(), Ok(id));
            assert!(!id.description().is_empty());
        }
        assert!("nope".parse::<RuleId>().is_err());
    }

    #[test]
    fn test_default_engine_order_matches_rule_ids() {
        let engine = RuleEngine::with_default_rules();
        assert_eq!(engine.rule_ids().collect::<Vec<_>>(), RuleId::ALL.to_vec());
    }

    #[test]
    fn test_rule_id_serde_is_kebab_case() {
        let json = serde_json::to_string(&RuleId::WeightNormalization).unwrap();
        assert_eq!(json, "\"weight-normalization\"");
    }
}
