//! Child placement requirements declared by type definitions.

use std::fmt;

use crate::type_id::{ATTRIBUTE_TYPE, NodeKey, Pattern};

/// Whether a requirement admits one child or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    #[default]
    Single,
    Array,
}

/// A permitted `(childType, childSubType, childName)` placement under a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildRequirement {
    pub child_type: Pattern,
    pub child_sub_type: Pattern,
    pub name: Pattern,
    pub cardinality: Cardinality,
    pub required: bool,
}

/// Identity of a requirement for override purposes.
pub type RequirementKey<'a> = (&'a Pattern, &'a Pattern, &'a Pattern);

impl ChildRequirement {
    pub fn new(
        child_type: impl Into<Pattern>,
        child_sub_type: impl Into<Pattern>,
        name: impl Into<Pattern>,
    ) -> Self {
        Self {
            child_type: child_type.into(),
            child_sub_type: child_sub_type.into(),
            name: name.into(),
            cardinality: Cardinality::Single,
            required: false,
        }
    }

    /// An optional single child.
    pub fn optional(
        child_type: impl Into<Pattern>,
        child_sub_type: impl Into<Pattern>,
        name: impl Into<Pattern>,
    ) -> Self {
        Self::new(child_type, child_sub_type, name)
    }

    /// A required single child.
    pub fn required(
        child_type: impl Into<Pattern>,
        child_sub_type: impl Into<Pattern>,
        name: impl Into<Pattern>,
    ) -> Self {
        Self::new(child_type, child_sub_type, name).with_required(true)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn matches(&self, child_type: &str, child_sub_type: &str, child_name: &str) -> bool {
        self.child_type.matches(child_type)
            && self.child_sub_type.matches(child_sub_type)
            && self.name.matches(child_name)
    }

    pub fn matches_key(&self, key: &NodeKey<'_>) -> bool {
        self.matches(key.type_name, key.sub_type, key.name)
    }

    /// Whether this requirement places `attr` children.
    pub fn is_attribute(&self) -> bool {
        self.child_type.as_exact() == Some(ATTRIBUTE_TYPE)
    }

    pub fn is_wildcard(&self) -> bool {
        self.name.is_wildcard() || self.child_type.is_wildcard() || self.child_sub_type.is_wildcard()
    }

    pub fn key(&self) -> RequirementKey<'_> {
        (&self.child_type, &self.child_sub_type, &self.name)
    }

    /// Human-readable summary, e.g. `optional attribute 'required' of type boolean`.
    pub fn describe(&self) -> String {
        let mut desc = String::from(if self.required { "required" } else { "optional" });
        desc.push_str(match self.child_type.as_exact() {
            Some(ATTRIBUTE_TYPE) => " attribute",
            Some("field") => " field",
            _ => " child",
        });
        if let Some(name) = self.name.as_exact() {
            desc.push_str(&format!(" '{name}'"));
        }
        if let Some(sub) = self.child_sub_type.as_exact() {
            desc.push_str(&format!(" of type {sub}"));
        }
        if self.cardinality == Cardinality::Array {
            desc.push_str(" (array)");
        }
        desc
    }
}

impl fmt::Display for ChildRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} child[name={}, type={}.{}]",
            if self.required { "required" } else { "optional" },
            self.name,
            self.child_type,
            self.child_sub_type
        )
    }
}
