//! Metadata object graph.
//!
//! A [`MetaGraph`] is the runtime tree of typed nodes (objects, fields,
//! attributes, ...) described by a [`meta_core::MetaDataRegistry`]. Nodes are
//! stored in an arena and linked by [`NodeId`]. Each link and each value
//! change is checked by the registry's constraint enforcer before it is
//! applied, so a rejected mutation never leaves a partial edit behind.
//!
//! Graphs are built during a bounded loading phase, optionally through a
//! [`LoadSession`] that collects violations instead of stopping at the first,
//! then frozen and queried through a per-node cache.

pub mod cache;
pub mod error;
pub mod graph;
pub mod node;
pub mod object;
pub mod session;

pub use cache::CacheStats;
pub use error::{GraphError, Result};
pub use graph::{GraphStats, MetaGraph};
pub use node::{MetaNode, NodeId};
pub use object::{DEFAULT_VALUE_ATTR, DataObject};
pub use session::LoadSession;
