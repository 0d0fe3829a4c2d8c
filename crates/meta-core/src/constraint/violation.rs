use std::fmt;

use serde::Serialize;

use crate::value::Value;

/// Which family of constraint produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Placement,
    Regex,
    Required,
    Length,
    Range,
    Enum,
    Uniqueness,
    Custom,
    Relationship,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Placement => "placement",
            ConstraintKind::Regex => "regex",
            ConstraintKind::Required => "required",
            ConstraintKind::Length => "length",
            ConstraintKind::Range => "range",
            ConstraintKind::Enum => "enum",
            ConstraintKind::Uniqueness => "uniqueness",
            ConstraintKind::Custom => "custom",
            ConstraintKind::Relationship => "relationship",
        };
        f.write_str(name)
    }
}

/// Ancestor chain of node names, root first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Append a segment, returning the extended path.
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// One failed placement, validation or relationship check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintViolation {
    pub constraint_id: String,
    pub kind: ConstraintKind,
    pub message: String,
    pub path: NodePath,
    pub value: Option<Value>,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "constraint '{}' violated at {}: {}",
            self.constraint_id, self.path, self.message
        )
    }
}

impl std::error::Error for ConstraintViolation {}
