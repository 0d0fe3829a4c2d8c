//! Error types for meta-graph

use meta_core::ConstraintViolation;

use crate::node::NodeId;

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while building or querying a metadata graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The graph was frozen and no longer accepts mutations.
    #[error("graph is frozen; the loading phase has ended")]
    Frozen,

    /// A node id does not belong to this graph.
    #[error("unknown node {id}")]
    UnknownNode { id: NodeId },

    /// The node already has a parent.
    #[error("node '{name}' is already attached")]
    AlreadyAttached { name: String },

    /// Linking would make a node its own ancestor.
    #[error("cannot add '{child}' under '{parent}': it is an ancestor of its new parent")]
    CyclicLink { parent: String, child: String },

    /// A super node was rejected.
    #[error("invalid super node for '{name}': {reason}")]
    InvalidSuper { name: String, reason: String },

    /// An instance was requested from a node that is not an object.
    #[error("node '{name}' is not an object")]
    NotAnObject { name: String },

    /// A data object was given a value for a field its object does not declare.
    #[error("object '{object}' has no field '{field}'")]
    UnknownField { object: String, field: String },

    // Transparent wrapper for registry and constraint errors
    #[error(transparent)]
    Core(#[from] meta_core::Error),
}

impl GraphError {
    /// The constraint violation carried by this error, if any.
    pub fn as_violation(&self) -> Option<&ConstraintViolation> {
        match self {
            GraphError::Core(e) => e.as_violation(),
            _ => None,
        }
    }

    pub fn is_violation(&self) -> bool {
        self.as_violation().is_some()
    }
}

impl From<ConstraintViolation> for GraphError {
    fn from(violation: ConstraintViolation) -> Self {
        GraphError::Core(violation.into())
    }
}
