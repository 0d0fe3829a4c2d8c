//! Type definitions and the fluent builder used to declare them.
//!
//! A [`TypeDefinition`] is immutable once built. Providers describe a type
//! through [`TypeDefinitionBuilder`]:
//!
//! ```
//! use meta_core::{Binding, DeclareChildren, NodeRole, NodeTemplate, TypeDefinitionBuilder};
//!
//! let def = TypeDefinitionBuilder::new()
//!     .type_name("field")
//!     .sub_type("string")
//!     .inherits_from("field", "base")
//!     .optional_attribute("int", "maxLength")
//!     .build(Binding::of("StringField", NodeTemplate::new(NodeRole::Field)))
//!     .unwrap();
//!
//! assert_eq!(def.type_id().to_string(), "field.string");
//! assert_eq!(def.attribute_requirements().count(), 1);
//! ```

use crate::binding::Binding;
use crate::error::{Error, Result};
use crate::requirement::{Cardinality, ChildRequirement};
use crate::type_id::{ATTRIBUTE_TYPE, TypeId};

/// A registered metadata kind.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    type_id: TypeId,
    binding: Binding,
    parent: Option<TypeId>,
    requirements: Vec<ChildRequirement>,
    description: Option<String>,
}

impl TypeDefinition {
    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn type_name(&self) -> &str {
        self.type_id.type_name()
    }

    pub fn sub_type(&self) -> &str {
        self.type_id.sub_type()
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Declared parent type, if any.
    pub fn parent(&self) -> Option<&TypeId> {
        self.parent.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Requirements declared directly on this type, in declaration order.
    pub fn direct_requirements(&self) -> &[ChildRequirement] {
        &self.requirements
    }

    /// The `attr` subset of the direct requirements.
    pub fn attribute_requirements(&self) -> impl Iterator<Item = &ChildRequirement> {
        self.requirements.iter().filter(|r| r.is_attribute())
    }

    /// Copy of this definition with `extra` requirements merged in.
    ///
    /// A requirement with the same identity as an existing one replaces it in
    /// place; new identities are appended.
    pub(crate) fn extended(&self, extra: Vec<ChildRequirement>) -> TypeDefinition {
        let mut requirements = self.requirements.clone();
        for req in extra {
            match requirements.iter_mut().find(|r| r.key() == req.key()) {
                Some(existing) => *existing = req,
                None => requirements.push(req),
            }
        }
        TypeDefinition {
            requirements,
            ..self.clone()
        }
    }
}

/// Requirement declaration shared by the definition builder and type extensions.
pub trait DeclareChildren: Sized {
    /// Add a fully specified requirement.
    fn child(self, requirement: ChildRequirement) -> Self;

    fn optional_attribute(self, sub_type: &str, name: &str) -> Self {
        self.child(ChildRequirement::optional(ATTRIBUTE_TYPE, sub_type, name))
    }

    fn required_attribute(self, sub_type: &str, name: &str) -> Self {
        self.child(ChildRequirement::required(ATTRIBUTE_TYPE, sub_type, name))
    }

    fn optional_attribute_array(self, sub_type: &str, name: &str) -> Self {
        self.child(
            ChildRequirement::optional(ATTRIBUTE_TYPE, sub_type, name)
                .with_cardinality(Cardinality::Array),
        )
    }

    fn optional_child(self, child_type: &str, sub_type: &str, name: &str) -> Self {
        self.child(ChildRequirement::optional(child_type, sub_type, name))
    }

    fn required_child(self, child_type: &str, sub_type: &str, name: &str) -> Self {
        self.child(ChildRequirement::required(child_type, sub_type, name))
    }

    fn optional_child_array(self, child_type: &str, sub_type: &str, name: &str) -> Self {
        self.child(
            ChildRequirement::optional(child_type, sub_type, name)
                .with_cardinality(Cardinality::Array),
        )
    }

    fn required_child_array(self, child_type: &str, sub_type: &str, name: &str) -> Self {
        self.child(
            ChildRequirement::required(child_type, sub_type, name)
                .with_cardinality(Cardinality::Array),
        )
    }
}

/// Fluent builder for [`TypeDefinition`].
#[derive(Debug, Clone, Default)]
pub struct TypeDefinitionBuilder {
    type_name: Option<String>,
    sub_type: Option<String>,
    parent: Option<TypeId>,
    requirements: Vec<ChildRequirement>,
    description: Option<String>,
}

impl TypeDefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inherits_from(mut self, type_name: impl Into<String>, sub_type: impl Into<String>) -> Self {
        self.parent = Some(TypeId::new(type_name, sub_type));
        self
    }

    /// Finish the definition.
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompleteDefinition` when the type or subtype is
    /// missing or blank, and `Error::InheritanceCycle` when the type names
    /// itself as parent.
    pub fn build(self, binding: Binding) -> Result<TypeDefinition> {
        let incomplete = |reason: &str| Error::IncompleteDefinition {
            binding: binding.name().to_string(),
            reason: reason.to_string(),
        };
        let type_name = self
            .type_name
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| incomplete("type is required"))?;
        let sub_type = self
            .sub_type
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| incomplete("subType is required"))?;
        let type_id = TypeId::new(type_name, sub_type);

        if self.parent.as_ref() == Some(&type_id) {
            return Err(Error::InheritanceCycle {
                chain: format!("{type_id} -> {type_id}"),
            });
        }

        Ok(TypeDefinition {
            type_id,
            binding,
            parent: self.parent,
            requirements: self.requirements,
            description: self.description,
        })
    }
}

impl DeclareChildren for TypeDefinitionBuilder {
    fn child(mut self, requirement: ChildRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }
}
