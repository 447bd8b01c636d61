//! Report and snapshot rendering

use anyhow::{Context, Result};
use clap::ValueEnum;
use rigcheck_core::{Report, RigSnapshot, RigStats};
use std::fmt::Write;

/// How `check` prints its report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Grouped, human-readable findings
    #[default]
    Text,
    /// The full report as pretty-printed JSON
    Json,
}

pub fn render_report(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")
        }
    }
}

/// Statistics plus the joint hierarchy, one joint per line
pub fn describe_snapshot(snapshot: &RigSnapshot) -> String {
    let skeleton = snapshot.skeleton();
    let mut out = String::new();
    let _ = writeln!(out, "Rig: {}", RigStats::of(snapshot));
    let _ = writeln!(
        out,
        "Tweaks: {}",
        if snapshot.mesh().tweaks().is_some() { "present" } else { "none" }
    );

    if skeleton.is_empty() {
        return out;
    }

    let _ = writeln!(out, "\nJoints:");
    let mut stack: Vec<_> = skeleton
        .iter()
        .filter(|(_, joint)| joint.parent.is_none())
        .map(|(id, _)| (id, 0usize))
        .collect();
    stack.reverse();

    while let Some((id, depth)) = stack.pop() {
        let joint = skeleton.joint(id);
        let label = match &joint.label.kind {
            Some(kind) if joint.label.is_labeled() => format!("{:?} {}", joint.label.side, kind),
            _ => "unlabeled".to_string(),
        };
        let role = if snapshot.is_bound(id) {
            "bound"
        } else if snapshot.is_stub(id) {
            "stub"
        } else {
            "unbound"
        };
        let _ = writeln!(
            out,
            "  {}{} [{}, {}]",
            "  ".repeat(depth),
            joint.name,
            label,
            role
        );
        for &child in skeleton.children(id).iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    out
}
