//! Two-tier constraint model.
//!
//! Placement constraints are an allow-list over parent/child structure: any
//! applicable constraint with `allowed = true` sanctions a placement. Validation
//! constraints are closed: every applicable one must pass. Relationship
//! constraints check cross-references once a graph is loaded.

mod enforcer;
mod placement;
mod relationship;
pub mod rules;
mod validation;
mod violation;

use std::fmt;

pub use enforcer::{Candidate, ConstraintEnforcer, PLACEMENT_CONSTRAINT_ID};
pub use placement::PlacementConstraint;
pub use relationship::{ReferenceResolver, RelationshipConstraint};
pub use rules::{NoSiblings, Rejection, RuleContext, RuleResult, Sibling, SiblingScan, ValidationRule};
pub use validation::{ValidationConstraint, ValueSource};
pub use violation::{ConstraintKind, ConstraintViolation, NodePath};

use crate::type_id::{NodeKey, Pattern, TypeId};

/// A `(type, subType, name)` match pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Target {
    pub type_name: Pattern,
    pub sub_type: Pattern,
    pub name: Pattern,
}

impl Target {
    pub fn new(
        type_name: impl Into<Pattern>,
        sub_type: impl Into<Pattern>,
        name: impl Into<Pattern>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            sub_type: sub_type.into(),
            name: name.into(),
        }
    }

    /// Match any node of `type_name.sub_type` regardless of name.
    pub fn of_type(type_name: impl Into<Pattern>, sub_type: impl Into<Pattern>) -> Self {
        Self::new(type_name, sub_type, Pattern::Any)
    }

    pub fn matches(&self, key: &NodeKey<'_>) -> bool {
        self.type_name.matches(key.type_name)
            && self.sub_type.matches(key.sub_type)
            && self.name.matches(key.name)
    }

    pub fn matches_type(&self, type_id: &TypeId) -> bool {
        self.type_name.matches(type_id.type_name()) && self.sub_type.matches(type_id.sub_type())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.sub_type)?;
        if !self.name.is_wildcard() {
            write!(f, "[{}]", self.name)?;
        }
        Ok(())
    }
}

/// A registered constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    Placement(PlacementConstraint),
    Validation(ValidationConstraint),
    Relationship(RelationshipConstraint),
}

impl Constraint {
    pub fn id(&self) -> &str {
        match self {
            Constraint::Placement(c) => c.id(),
            Constraint::Validation(c) => c.id(),
            Constraint::Relationship(c) => c.id(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Constraint::Placement(c) => c.description(),
            Constraint::Validation(c) => c.description(),
            Constraint::Relationship(c) => c.description(),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Placement(_) => ConstraintKind::Placement,
            Constraint::Validation(c) => c.rule().kind(),
            Constraint::Relationship(_) => ConstraintKind::Relationship,
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self, Constraint::Placement(_))
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, Constraint::Relationship(_))
    }
}

impl From<PlacementConstraint> for Constraint {
    fn from(c: PlacementConstraint) -> Self {
        Constraint::Placement(c)
    }
}

impl From<ValidationConstraint> for Constraint {
    fn from(c: ValidationConstraint) -> Self {
        Constraint::Validation(c)
    }
}

impl From<RelationshipConstraint> for Constraint {
    fn from(c: RelationshipConstraint) -> Self {
        Constraint::Relationship(c)
    }
}
