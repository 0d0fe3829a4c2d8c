use tracing::trace;

use crate::constraint::rules::{Rejection, SiblingScan};
use crate::constraint::{
    Constraint, ConstraintKind, ConstraintViolation, NodePath, ReferenceResolver, ValidationConstraint,
};
use crate::error::Result;
use crate::registry::MetaDataRegistry;
use crate::type_id::{NodeKey, TypeId};
use crate::value::Value;

/// Id reported when neither a placement constraint nor the parent's declared
/// child requirements admit a child.
pub const PLACEMENT_CONSTRAINT_ID: &str = "registry.placement";

/// A node about to be linked or given a new value.
pub struct Candidate<'a> {
    pub key: NodeKey<'a>,
    pub value: Option<&'a Value>,
    pub siblings: &'a dyn SiblingScan,
    /// Computes the node's path. Only called when reporting a violation.
    pub locate: &'a dyn Fn() -> NodePath,
}

/// Read-only checker run by graph builders before each mutation.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEnforcer<'r> {
    registry: &'r MetaDataRegistry,
}

impl<'r> ConstraintEnforcer<'r> {
    pub fn new(registry: &'r MetaDataRegistry) -> Self {
        Self { registry }
    }

    /// Check placing `candidate` under a node of type `parent`.
    ///
    /// Walks the constraint snapshot once. A placement is sanctioned by any
    /// applicable allowing placement constraint, otherwise by the registry's
    /// declared child requirements. Every applicable validation constraint
    /// must pass; the first failure in registration order is reported, after
    /// any placement violation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Violation` on rejection, or a registry error when the
    /// parent's inheritance chain cannot be resolved.
    pub fn enforce_on_add_child(&self, parent: &TypeId, candidate: &Candidate<'_>) -> Result<()> {
        let constraints = self.registry.constraints();
        let mut sanctioned = false;
        let mut failure: Option<(&ValidationConstraint, Rejection)> = None;

        for constraint in constraints.iter() {
            match constraint {
                Constraint::Placement(placement) => {
                    sanctioned = sanctioned || placement.sanctions(parent, &candidate.key);
                }
                Constraint::Validation(validation)
                    if failure.is_none() && validation.applies_to(&candidate.key) =>
                {
                    if let Err(rejection) =
                        validation.validate(candidate.key, candidate.value, candidate.siblings)
                    {
                        failure = Some((validation, rejection));
                    }
                }
                Constraint::Validation(_) | Constraint::Relationship(_) => {}
            }
        }

        let key = &candidate.key;
        if !sanctioned
            && !self.registry.accepts_child(
                parent.type_name(),
                parent.sub_type(),
                key.type_name,
                key.sub_type,
                key.name,
            )?
        {
            return Err(self.placement_violation(parent, candidate).into());
        }
        if let Some((constraint, rejection)) = failure {
            return Err(Self::validation_violation(constraint, rejection, candidate).into());
        }

        trace!(parent = %parent, child = %candidate.key, "placement accepted");
        Ok(())
    }

    /// Check a new value for an attached node against validation constraints.
    pub fn enforce_on_set_value(&self, candidate: &Candidate<'_>) -> Result<()> {
        let constraints = self.registry.constraints();
        for constraint in constraints.iter() {
            let Constraint::Validation(validation) = constraint else {
                continue;
            };
            if !validation.applies_to(&candidate.key) {
                continue;
            }
            if let Err(rejection) = validation.validate(candidate.key, candidate.value, candidate.siblings) {
                return Err(Self::validation_violation(validation, rejection, candidate).into());
            }
        }
        trace!(node = %candidate.key, "value accepted");
        Ok(())
    }

    /// Check the references a loaded node holds.
    ///
    /// Every applicable relationship constraint is evaluated and each
    /// failure reported, in registration order.
    pub fn enforce_relationships(
        &self,
        candidate: &Candidate<'_>,
        resolver: &dyn ReferenceResolver,
    ) -> Vec<ConstraintViolation> {
        let constraints = self.registry.constraints();
        let mut violations = Vec::new();
        for constraint in constraints.iter() {
            let Constraint::Relationship(relationship) = constraint else {
                continue;
            };
            if !relationship.applies_to(&candidate.key) {
                continue;
            }
            if let Err(rejection) = relationship.check(&candidate.key, candidate.value, resolver) {
                violations.push(ConstraintViolation {
                    constraint_id: relationship.id().to_string(),
                    kind: ConstraintKind::Relationship,
                    message: rejection.message,
                    path: (candidate.locate)(),
                    value: candidate.value.cloned(),
                });
            }
        }
        if !violations.is_empty() {
            trace!(node = %candidate.key, count = violations.len(), "references rejected");
        }
        violations
    }

    fn placement_violation(&self, parent: &TypeId, candidate: &Candidate<'_>) -> ConstraintViolation {
        let supported = self
            .registry
            .supported_children_description(parent.type_name(), parent.sub_type());
        ConstraintViolation {
            constraint_id: PLACEMENT_CONSTRAINT_ID.to_string(),
            kind: ConstraintKind::Placement,
            message: format!(
                "{} is not allowed under {parent}; supported children: {supported}",
                candidate.key
            ),
            path: (candidate.locate)(),
            value: candidate.value.cloned(),
        }
    }

    fn validation_violation(
        constraint: &ValidationConstraint,
        rejection: Rejection,
        candidate: &Candidate<'_>,
    ) -> ConstraintViolation {
        ConstraintViolation {
            constraint_id: constraint.id().to_string(),
            kind: constraint.rule().kind(),
            message: rejection.message,
            path: (candidate.locate)(),
            value: constraint.sourced_value(&candidate.key, candidate.value),
        }
    }
}
