//! Validation report
//!
//! Findings are stable-sorted by severity, then by rule evaluation order, so
//! findings of one rule keep the order the rule produced them in.

use std::fmt;

use serde::Serialize;

use crate::finding::{Finding, Severity};
use crate::rules::RuleId;
use crate::snapshot::{JointId, RigSnapshot};

/// Size of the validated rig
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RigStats {
    pub vertices: usize,
    pub faces: usize,
    pub edges: usize,
    pub joints: usize,
    pub skinned: bool,
}

impl RigStats {
    pub fn of(snapshot: &RigSnapshot) -> Self {
        Self {
            vertices: snapshot.mesh().vertex_count(),
            faces: snapshot.mesh().face_count(),
            edges: snapshot.geometry().edge_count(),
            joints: snapshot.skeleton().len(),
            skinned: snapshot.skin().is_some(),
        }
    }
}

impl fmt::Display for RigStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} faces, {} edges, {} joints ({})",
            self.vertices,
            self.faces,
            self.edges,
            self.joints,
            if self.skinned { "skinned" } else { "no skin" }
        )
    }
}

/// Consecutive findings sharing severity and rule
#[derive(Debug, Clone, Copy)]
pub struct FindingGroup<'a> {
    pub severity: Severity,
    pub rule: RuleId,
    pub findings: &'a [Finding],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
struct SeverityCounts {
    errors: usize,
    warnings: usize,
    infos: usize,
}

/// Ordered findings of one validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    stats: RigStats,
    counts: SeverityCounts,
    findings: Vec<Finding>,
}

impl Report {
    pub fn build(stats: RigStats, mut findings: Vec<Finding>) -> Self {
        findings.sort_by_key(|f| (f.severity, f.rule));

        let mut counts = SeverityCounts::default();
        for finding in &findings {
            match finding.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
        }

        Self {
            stats,
            counts,
            findings,
        }
    }

    pub fn stats(&self) -> &RigStats {
        &self.stats
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.counts.errors,
            Severity::Warning => self.counts.warnings,
            Severity::Info => self.counts.infos,
        }
    }

    pub fn errors(&self) -> usize {
        self.counts.errors
    }

    pub fn warnings(&self) -> usize {
        self.counts.warnings
    }

    pub fn infos(&self) -> usize {
        self.counts.infos
    }

    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.counts.warnings > 0
    }

    /// No errors and no warnings
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }

    pub fn groups(&self) -> impl Iterator<Item = FindingGroup<'_>> + '_ {
        self.findings
            .chunk_by(|a, b| a.severity == b.severity && a.rule == b.rule)
            .map(|chunk| FindingGroup {
                severity: chunk[0].severity,
                rule: chunk[0].rule,
                findings: chunk,
            })
    }

    pub fn for_rule(&self, rule: RuleId) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.rule == rule)
    }

    pub fn for_joint(&self, joint: JointId) -> impl Iterator<Item = &Finding> + '_ {
        self.findings
            .iter()
            .filter(move |f| f.references_joint(joint))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rig: {}", self.stats)?;

        for group in self.groups() {
            writeln!(
                f,
                "\n{} ({}, {}):",
                group.rule,
                group.severity,
                group.findings.len()
            )?;
            for finding in group.findings {
                write!(f, "  {}", finding.message)?;
                if !finding.elements.is_empty() {
                    let elements: Vec<String> =
                        finding.elements.iter().map(|e| e.to_string()).collect();
                    write!(f, " [{}]", elements.join(", "))?;
                }
                writeln!(f)?;
            }
        }

        write!(
            f,
            "\n{} error(s), {} warning(s), {} info",
            self.counts.errors, self.counts.warnings, self.counts.infos
        )
    }
}
