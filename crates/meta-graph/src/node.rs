//! Graph nodes and their arena ids.

use std::fmt;

use meta_core::{NodeKey, NodeRole, NodeTemplate, TypeId, Value, ValueKind};
use serde::Serialize;

/// Stable index of a node within its [`MetaGraph`](crate::MetaGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One typed node of a metadata graph.
///
/// Links are arena indices: `parent` is a back-reference, `children` are
/// owned in insertion order, `super_node` names a node this one inherits
/// children from.
#[derive(Debug, Clone)]
pub struct MetaNode {
    pub(crate) type_id: TypeId,
    pub(crate) name: String,
    pub(crate) role: NodeRole,
    pub(crate) value_kind: Option<ValueKind>,
    pub(crate) value: Option<Value>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) super_node: Option<NodeId>,
}

impl MetaNode {
    pub(crate) fn new(type_id: TypeId, name: String, template: NodeTemplate) -> Self {
        Self {
            type_id,
            name,
            role: template.role,
            value_kind: template.value_kind,
            value: None,
            parent: None,
            children: Vec::new(),
            super_node: None,
        }
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn type_name(&self) -> &str {
        self.type_id.type_name()
    }

    pub fn sub_type(&self) -> &str {
        self.type_id.sub_type()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Declared value type from the node's binding.
    pub fn value_kind(&self) -> Option<ValueKind> {
        self.value_kind
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn super_node(&self) -> Option<NodeId> {
        self.super_node
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// `(type, subType, name)` identity used for pattern matching.
    pub fn key(&self) -> NodeKey<'_> {
        NodeKey::from_type_id(&self.type_id, &self.name)
    }
}
