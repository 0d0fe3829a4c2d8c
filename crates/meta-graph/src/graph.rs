//! The metadata object graph.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use meta_core::constraint::{NoSiblings, Sibling};
use meta_core::{
    Candidate, ChildRequirement, ConstraintEnforcer, ConstraintViolation, MetaDataRegistry, NodeKey, NodePath,
    ReferenceResolver, Target, TypeId, Value, ATTRIBUTE_TYPE,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::{CacheStats, Query, QueryCache};
use crate::error::{GraphError, Result};
use crate::node::{MetaNode, NodeId};

/// Introspection figures for collaborators that apply their own limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub attached_count: usize,
    pub max_depth: usize,
    pub max_fan_out: usize,
    /// Number of enforcement passes run since the graph was created.
    pub enforcement_passes: u64,
    pub cache: CacheStats,
}

/// A tree of typed metadata nodes built against a shared registry.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Every link and
/// every value change on an attached node is checked by a
/// [`ConstraintEnforcer`] first; a rejected mutation leaves the graph as it
/// was. Once [`freeze`](Self::freeze) is called the graph is read-only.
///
/// ```
/// use std::sync::Arc;
///
/// use meta_core::{Binding, DeclareChildren, MetaDataRegistry, NodeRole, NodeTemplate};
/// use meta_graph::MetaGraph;
///
/// let registry = Arc::new(MetaDataRegistry::new());
/// registry
///     .register_type(Binding::of("Root", NodeTemplate::new(NodeRole::Root)), |b| {
///         b.type_name("metadata").sub_type("base").optional_child_array("object", "*", "*")
///     })
///     .unwrap();
/// registry
///     .register_type(Binding::of("Pojo", NodeTemplate::new(NodeRole::Object)), |b| {
///         b.type_name("object").sub_type("pojo")
///     })
///     .unwrap();
///
/// let mut graph = MetaGraph::new(registry, "metadata", "base", "app").unwrap();
/// let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
/// assert_eq!(graph.path(basket).unwrap().to_string(), "app/Basket");
/// ```
#[derive(Debug)]
pub struct MetaGraph {
    registry: Arc<MetaDataRegistry>,
    nodes: Vec<MetaNode>,
    root: NodeId,
    cache: QueryCache,
    checks_disabled: usize,
    enforcement_passes: u64,
    frozen: bool,
}

impl MetaGraph {
    /// Create a graph whose root node has type `type_name.sub_type`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the root type is not registered.
    pub fn new(registry: Arc<MetaDataRegistry>, type_name: &str, sub_type: &str, name: &str) -> Result<Self> {
        let template = registry.create_template(type_name, sub_type, name)?;
        let root = MetaNode::new(TypeId::new(type_name, sub_type), name.to_string(), template);
        Ok(Self {
            registry,
            nodes: vec![root],
            root: NodeId(0),
            cache: QueryCache::default(),
            checks_disabled: 0,
            enforcement_passes: 0,
            frozen: false,
        })
    }

    pub fn registry(&self) -> &Arc<MetaDataRegistry> {
        &self.registry
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&MetaNode> {
        self.nodes.get(id.0)
    }

    /// Like [`node`](Self::node), failing with `UnknownNode`.
    pub fn get(&self, id: NodeId) -> Result<&MetaNode> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode { id })
    }

    /// Number of nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// End the loading phase. Later mutations fail with `Frozen`.
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            debug!(nodes = self.nodes.len(), "Graph frozen");
        }
    }

    // ----- mutation -----

    /// Create a detached node of a registered type.
    pub fn create_node(&mut self, type_name: &str, sub_type: &str, name: &str) -> Result<NodeId> {
        self.ensure_mutable()?;
        let template = self.registry.create_template(type_name, sub_type, name)?;
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(MetaNode::new(TypeId::new(type_name, sub_type), name.to_string(), template));
        trace!(node = %id, type_name, sub_type, name, "Created node");
        Ok(id)
    }

    /// Link a detached node under `parent` after enforcing constraints.
    ///
    /// # Errors
    ///
    /// A constraint violation, or a registry error if the parent's type
    /// cannot be resolved. The graph is unchanged on error.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_mutable()?;
        let child_node = self.get(child)?;
        let parent_node = self.get(parent)?;
        if child_node.parent.is_some() || child == self.root {
            return Err(GraphError::AlreadyAttached {
                name: child_node.name.clone(),
            });
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(GraphError::CyclicLink {
                parent: parent_node.name.clone(),
                child: child_node.name.clone(),
            });
        }

        if self.checks_enabled() {
            let siblings = self.siblings(parent, None);
            let locate = || self.path_of(parent).join(child_node.name.as_str());
            let candidate = Candidate {
                key: child_node.key(),
                value: child_node.value.as_ref(),
                siblings: &siblings,
                locate: &locate,
            };
            ConstraintEnforcer::new(&self.registry).enforce_on_add_child(&parent_node.type_id, &candidate)?;
            self.enforcement_passes += 1;
        }

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.cache.invalidate();
        trace!(parent = %parent, child = %child, "Linked node");
        Ok(())
    }

    /// Create a node and link it under `parent` in one step.
    ///
    /// If the link is rejected the new node is discarded.
    pub fn attach(&mut self, parent: NodeId, type_name: &str, sub_type: &str, name: &str) -> Result<NodeId> {
        self.get(parent)?;
        let child = self.create_node(type_name, sub_type, name)?;
        self.link_or_discard(parent, child)
    }

    /// Create an `attr.<sub_type>` node holding `value` and link it under `parent`.
    pub fn attribute(
        &mut self,
        parent: NodeId,
        sub_type: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<NodeId> {
        self.get(parent)?;
        let child = self.create_node(ATTRIBUTE_TYPE, sub_type, name)?;
        let node = &mut self.nodes[child.0];
        let value = match node.value_kind {
            Some(kind) => kind.coerce(value.into()),
            None => Ok(value.into()),
        };
        match value {
            Ok(value) => node.value = Some(value),
            Err(e) => {
                self.discard(child);
                return Err(e.into());
            }
        }
        self.link_or_discard(parent, child)
    }

    /// Set a node's value, coerced to its declared kind.
    ///
    /// Attached nodes are validated first; detached nodes are checked when
    /// they are linked.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable()?;
        let node = self.get(id)?;
        let value = match node.value_kind {
            Some(kind) => kind.coerce(value.into())?,
            None => value.into(),
        };

        if let (Some(parent), true) = (node.parent, self.checks_enabled()) {
            let siblings = self.siblings(parent, Some(id));
            let locate = || self.path_of(id);
            let candidate = Candidate {
                key: node.key(),
                value: Some(&value),
                siblings: &siblings,
                locate: &locate,
            };
            ConstraintEnforcer::new(&self.registry).enforce_on_set_value(&candidate)?;
            self.enforcement_passes += 1;
        }

        self.nodes[id.0].value = Some(value);
        self.cache.invalidate();
        Ok(())
    }

    /// Make `id` inherit children from `super_node`.
    ///
    /// Both nodes must share a primary type and the super chain must stay
    /// acyclic.
    pub fn set_super(&mut self, id: NodeId, super_node: NodeId) -> Result<()> {
        self.ensure_mutable()?;
        let node = self.get(id)?;
        let parent = self.get(super_node)?;
        if node.type_name() != parent.type_name() {
            return Err(GraphError::InvalidSuper {
                name: node.name.clone(),
                reason: format!("'{}' is a {}, not a {}", parent.name, parent.type_name(), node.type_name()),
            });
        }
        if self.super_chain(super_node).any(|s| s == id) {
            return Err(GraphError::InvalidSuper {
                name: node.name.clone(),
                reason: format!("'{}' already inherits from it", parent.name),
            });
        }
        self.nodes[id.0].super_node = Some(super_node);
        self.cache.invalidate();
        Ok(())
    }

    /// Run `f` with constraint enforcement switched off.
    ///
    /// Scopes nest. Enforcement is restored when the outermost scope exits,
    /// including by panic.
    pub fn with_constraints_disabled<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.checks_disabled += 1;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *self)));
        self.checks_disabled -= 1;
        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    pub fn checks_enabled(&self) -> bool {
        self.checks_disabled == 0
    }

    // ----- cached queries -----

    /// Direct children of a node.
    pub fn children(&self, id: NodeId) -> Result<Arc<[NodeId]>> {
        let node = self.get(id)?;
        Ok(self
            .cache
            .get_or_compute(id, Query::Children, || node.children.clone()))
    }

    /// Children of the given type, own children first, then any inherited
    /// from the super chain whose name is not already present.
    pub fn children_of_type(&self, id: NodeId, type_name: &str, sub_type: Option<&str>) -> Result<Arc<[NodeId]>> {
        self.get(id)?;
        let query = Query::OfType {
            type_name: type_name.to_string(),
            sub_type: sub_type.map(String::from),
        };
        Ok(self.cache.get_or_compute(id, query, || {
            let mut seen = HashSet::new();
            let mut found = Vec::new();
            for holder in self.super_chain(id) {
                for &child in &self.nodes[holder.0].children {
                    let node = &self.nodes[child.0];
                    let wanted = node.type_name() == type_name && sub_type.is_none_or(|s| node.sub_type() == s);
                    if wanted && seen.insert(node.name.as_str()) {
                        found.push(child);
                    }
                }
            }
            found
        }))
    }

    /// The child of `type_name` called `name`, own or inherited.
    pub fn find_child(&self, id: NodeId, type_name: &str, name: &str) -> Result<Option<NodeId>> {
        self.get(id)?;
        let query = Query::Named {
            type_name: type_name.to_string(),
            name: name.to_string(),
        };
        let found = self.cache.get_or_compute(id, query, || {
            self.children_of_type(id, type_name, None)
                .map(|ids| ids.iter().copied().filter(|c| self.nodes[c.0].name == name).take(1).collect())
                .unwrap_or_default()
        });
        Ok(found.first().copied())
    }

    /// A field of an object by name.
    pub fn meta_field(&self, object: NodeId, name: &str) -> Result<Option<NodeId>> {
        self.find_child(object, "field", name)
    }

    /// Every field of an object, including inherited ones.
    pub fn object_fields(&self, object: NodeId) -> Result<Arc<[NodeId]>> {
        self.children_of_type(object, "field", None)
    }

    /// Value of the attribute called `name`, own or inherited.
    pub fn attribute_value(&self, id: NodeId, name: &str) -> Result<Option<Value>> {
        Ok(self
            .find_child(id, ATTRIBUTE_TYPE, name)?
            .and_then(|attr| self.nodes[attr.0].value.clone()))
    }

    // ----- introspection -----

    /// Names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Result<NodePath> {
        self.get(id)?;
        Ok(self.path_of(id))
    }

    /// Number of ancestors of `id`; the root has depth 0.
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        self.get(id)?;
        Ok(self.ancestors(id).count() - 1)
    }

    pub fn child_count(&self, id: NodeId) -> Result<usize> {
        Ok(self.get(id)?.children.len())
    }

    /// Required children of the node's type that it does not have yet.
    pub fn missing_required(&self, id: NodeId) -> Result<Vec<ChildRequirement>> {
        let node = self.get(id)?;
        let present: Vec<_> = self
            .super_chain(id)
            .flat_map(|holder| self.nodes[holder.0].children.iter())
            .map(|child| self.nodes[child.0].key())
            .collect();
        Ok(self
            .registry
            .missing_required_children(node.type_name(), node.sub_type(), &present)?)
    }

    /// Check the references held by every attached node against the
    /// registry's relationship constraints.
    ///
    /// Meant for the end of loading, when forward references have been
    /// filled in. All failures are returned, in depth-first order; the graph
    /// is not modified.
    pub fn validate_relationships(&self) -> Vec<ConstraintViolation> {
        let attached = self.attached();
        let resolver = AttachedNodes::index(self, &attached);
        let enforcer = ConstraintEnforcer::new(&self.registry);
        let mut violations = Vec::new();
        for &id in &attached {
            let node = &self.nodes[id.0];
            let locate = || self.path_of(id);
            let candidate = Candidate {
                key: node.key(),
                value: node.value.as_ref(),
                siblings: &NoSiblings,
                locate: &locate,
            };
            violations.extend(enforcer.enforce_relationships(&candidate, &resolver));
        }
        debug!(nodes = attached.len(), violations = violations.len(), "Checked relationships");
        violations
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.nodes.len(),
            enforcement_passes: self.enforcement_passes,
            cache: self.cache.stats(),
            ..GraphStats::default()
        };
        let mut pending = vec![(self.root, 0)];
        while let Some((id, depth)) = pending.pop() {
            let node = &self.nodes[id.0];
            stats.attached_count += 1;
            stats.max_depth = stats.max_depth.max(depth);
            stats.max_fan_out = stats.max_fan_out.max(node.children.len());
            pending.extend(node.children.iter().map(|&c| (c, depth + 1)));
        }
        stats
    }

    // ----- internals -----

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            Err(GraphError::Frozen)
        } else {
            Ok(())
        }
    }

    fn link_or_discard(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        match self.add_child(parent, child) {
            Ok(()) => Ok(child),
            Err(e) => {
                self.discard(child);
                Err(e)
            }
        }
    }

    /// Drop a node that was just created and never linked.
    fn discard(&mut self, id: NodeId) {
        if id.0 + 1 == self.nodes.len() {
            self.nodes.pop();
        }
    }

    /// The root and every node linked below it, depth-first in insertion order.
    fn attached(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            order.push(id);
            pending.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }

    /// `id` followed by each of its ancestors.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.nodes[current.0].parent)
    }

    /// `id` followed by each node it inherits from.
    fn super_chain(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.nodes[current.0].super_node)
    }

    fn path_of(&self, id: NodeId) -> NodePath {
        let mut names: Vec<String> = self.ancestors(id).map(|a| self.nodes[a.0].name.clone()).collect();
        names.reverse();
        NodePath::new(names)
    }

    fn siblings(&self, parent: NodeId, exclude: Option<NodeId>) -> Vec<Sibling<'_>> {
        self.nodes[parent.0]
            .children
            .iter()
            .filter(|&&c| Some(c) != exclude)
            .map(|c| {
                let node = &self.nodes[c.0];
                Sibling {
                    key: node.key(),
                    value: node.value.as_ref(),
                }
            })
            .collect()
    }
}

/// Name index over the attached nodes of a graph.
struct AttachedNodes<'g> {
    graph: &'g MetaGraph,
    by_name: HashMap<&'g str, Vec<NodeId>>,
}

impl<'g> AttachedNodes<'g> {
    fn index(graph: &'g MetaGraph, attached: &[NodeId]) -> Self {
        let mut by_name: HashMap<&str, Vec<NodeId>> = HashMap::new();
        for &id in attached {
            by_name.entry(graph.nodes[id.0].name.as_str()).or_default().push(id);
        }
        Self { graph, by_name }
    }
}

impl ReferenceResolver for AttachedNodes<'_> {
    fn resolve(&self, reference: &str, target: &Target) -> Option<NodeKey<'_>> {
        self.by_name
            .get(reference)?
            .iter()
            .map(|id| self.graph.nodes[id.0].key())
            .find(|key| target.matches(key))
    }
}
