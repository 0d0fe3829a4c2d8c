use crate::constraint::Target;
use crate::type_id::{NodeKey, Pattern, TypeId};

/// Allow-list entry for a parent/child placement.
///
/// There is no deny form: a constraint with `allowed = false` sanctions
/// nothing, and a placement rejected here may still be accepted by the
/// registry's declared child requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementConstraint {
    id: String,
    description: String,
    parent: Target,
    child: Target,
    allowed: bool,
}

impl PlacementConstraint {
    /// An allowing constraint with wildcard patterns on every segment.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            parent: Target::default(),
            child: Target::default(),
            allowed: true,
        }
    }

    pub fn parent(mut self, type_name: impl Into<Pattern>, sub_type: impl Into<Pattern>) -> Self {
        self.parent = Target::of_type(type_name, sub_type);
        self
    }

    pub fn child(mut self, type_name: impl Into<Pattern>, sub_type: impl Into<Pattern>) -> Self {
        self.child.type_name = type_name.into();
        self.child.sub_type = sub_type.into();
        self
    }

    pub fn named(mut self, name: impl Into<Pattern>) -> Self {
        self.child.name = name.into();
        self
    }

    pub fn allowed(mut self, allowed: bool) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn parent_pattern(&self) -> &Target {
        &self.parent
    }

    pub fn child_pattern(&self) -> &Target {
        &self.child
    }

    pub fn applies_to(&self, parent: &TypeId, child: &NodeKey<'_>) -> bool {
        self.parent.matches_type(parent) && self.child.matches(child)
    }

    /// Whether this constraint sanctions the placement.
    pub fn sanctions(&self, parent: &TypeId, child: &NodeKey<'_>) -> bool {
        self.allowed && self.applies_to(parent, child)
    }
}
