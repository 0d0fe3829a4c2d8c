//! Type keys and wildcard patterns.
//!
//! Every metadata node kind is identified by a two-level key such as
//! `field.string`. Requirements and constraints match against these keys with
//! [`Pattern`]s, each segment either an exact string or the `*` wildcard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wildcard segment that matches any type, subtype or name.
pub const WILDCARD: &str = "*";

/// Subtype reserved for the root definition of a type family.
pub const BASE_SUBTYPE: &str = "base";

/// Child type used for attribute requirements.
pub const ATTRIBUTE_TYPE: &str = "attr";

/// A `(type, subType)` pair identifying a registered metadata kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeId {
    type_name: String,
    sub_type: String,
}

impl TypeId {
    /// Create a type id from its two segments.
    pub fn new(type_name: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            sub_type: sub_type.into(),
        }
    }

    /// Create the `base` root id for a type family.
    pub fn base(type_name: impl Into<String>) -> Self {
        Self::new(type_name, BASE_SUBTYPE)
    }

    /// Primary type (e.g. `field`).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Subtype (e.g. `string`).
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Whether this is the `base` root of its family.
    pub fn is_base(&self) -> bool {
        self.sub_type == BASE_SUBTYPE
    }

    /// Qualified `type.subType` form.
    pub fn qualified_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.sub_type)
    }
}

impl FromStr for TypeId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((t, st)) if !t.is_empty() && !st.is_empty() => Ok(Self::new(t, st)),
            _ => Err(format!("expected 'type.subType', got '{s}'")),
        }
    }
}

impl TryFrom<String> for TypeId {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeId> for String {
    fn from(id: TypeId) -> Self {
        id.to_string()
    }
}

/// One segment of a match pattern: exact text or `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Pattern {
    #[default]
    Any,
    Exact(String),
}

impl Pattern {
    /// Whether `value` satisfies this pattern.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(expected) => expected == value,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Pattern::Any)
    }

    /// The exact text, if this is not a wildcard.
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            Pattern::Any => None,
            Pattern::Exact(s) => Some(s),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => f.write_str(WILDCARD),
            Pattern::Exact(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        if s == WILDCARD || s.is_empty() {
            Pattern::Any
        } else {
            Pattern::Exact(s.to_string())
        }
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        if s == WILDCARD || s.is_empty() {
            Pattern::Any
        } else {
            Pattern::Exact(s)
        }
    }
}

impl From<Option<&str>> for Pattern {
    fn from(s: Option<&str>) -> Self {
        s.map(Pattern::from).unwrap_or(Pattern::Any)
    }
}

/// The `(type, subType, name)` identity of a concrete node, used as the input
/// to pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKey<'a> {
    pub type_name: &'a str,
    pub sub_type: &'a str,
    pub name: &'a str,
}

impl<'a> NodeKey<'a> {
    pub fn new(type_name: &'a str, sub_type: &'a str, name: &'a str) -> Self {
        Self {
            type_name,
            sub_type,
            name,
        }
    }

    pub fn from_type_id(type_id: &'a TypeId, name: &'a str) -> Self {
        Self::new(type_id.type_name(), type_id.sub_type(), name)
    }
}

impl fmt::Display for NodeKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} '{}'", self.type_name, self.sub_type, self.name)
    }
}
