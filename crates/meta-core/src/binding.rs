//! Implementation bindings: explicit factories that describe how a node of a
//! registered type is built.

use std::fmt;
use std::sync::Arc;

use crate::type_id::TypeId;
use crate::value::ValueKind;

/// Structural role of a node in the metadata graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Root,
    Object,
    Field,
    Attribute,
    Validator,
    View,
    Identity,
    Relationship,
    Other,
}

/// What a binding factory produces for a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTemplate {
    pub role: NodeRole,
    /// Declared value type, if the node carries or describes a value.
    pub value_kind: Option<ValueKind>,
}

impl NodeTemplate {
    pub fn new(role: NodeRole) -> Self {
        Self {
            role,
            value_kind: None,
        }
    }

    pub fn with_value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }
}

/// Factory invoked with the node's type id and name.
pub type NodeFactory = Arc<dyn Fn(&TypeId, &str) -> NodeTemplate + Send + Sync>;

/// Named factory backing a registered type.
#[derive(Clone)]
pub struct Binding {
    name: String,
    factory: NodeFactory,
}

impl Binding {
    /// Bind a name to an arbitrary factory closure.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&TypeId, &str) -> NodeTemplate + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Bind a name to a factory that always yields `template`.
    pub fn of(name: impl Into<String>, template: NodeTemplate) -> Self {
        Self::new(name, move |_, _| template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the factory for a node.
    pub fn instantiate(&self, type_id: &TypeId, node_name: &str) -> NodeTemplate {
        (self.factory)(type_id, node_name)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("name", &self.name).finish_non_exhaustive()
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
