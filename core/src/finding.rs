//! Rule findings and the elements they point at

use std::fmt;

use serde::Serialize;

use crate::geometry::Edge;
use crate::rules::RuleId;
use crate::snapshot::{JointId, Skeleton};

/// How serious a finding is. Orders most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mesh or skeleton element a consumer can select or highlight
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementRef {
    Vertex { index: u32 },
    Edge { a: u32, b: u32 },
    Face { index: u32 },
    Joint { index: usize, name: String },
}

impl ElementRef {
    pub fn vertex(index: u32) -> Self {
        ElementRef::Vertex { index }
    }

    pub fn edge(edge: Edge) -> Self {
        ElementRef::Edge {
            a: edge.0,
            b: edge.1,
        }
    }

    pub fn face(index: u32) -> Self {
        ElementRef::Face { index }
    }

    pub fn joint(skeleton: &Skeleton, id: JointId) -> Self {
        ElementRef::Joint {
            index: id.0,
            name: skeleton.joint(id).name.clone(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Vertex { index } => write!(f, "vtx[{index}]"),
            ElementRef::Edge { a, b } => write!(f, "e[{a}-{b}]"),
            ElementRef::Face { index } => write!(f, "f[{index}]"),
            ElementRef::Joint { name, .. } => f.write_str(name),
        }
    }
}

/// One rule violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub rule: RuleId,
    pub message: String,
    pub elements: Vec<ElementRef>,
}

impl Finding {
    pub fn new(severity: Severity, rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            severity,
            rule,
            message: message.into(),
            elements: Vec::new(),
        }
    }

    pub fn error(rule: RuleId, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, rule, message)
    }

    pub fn warning(rule: RuleId, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, rule, message)
    }

    pub fn info(rule: RuleId, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, rule, message)
    }

    pub fn with_element(mut self, element: ElementRef) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_elements(mut self, elements: impl IntoIterator<Item = ElementRef>) -> Self {
        self.elements.extend(elements);
        self
    }

    /// Does this finding point at the given joint
    pub fn references_joint(&self, id: JointId) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, ElementRef::Joint { index, .. } if *index == id.0))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule, self.message)
    }
}
