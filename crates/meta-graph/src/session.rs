//! Batch loading with fail-fast or collect-all violation handling.

use meta_core::{ConstraintViolation, Value, ViolationMode};
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::graph::MetaGraph;
use crate::node::NodeId;

/// A batch of mutations against one graph.
///
/// In [`ViolationMode::FailFast`] the first violation is returned as an
/// error. In [`ViolationMode::CollectAll`] each violation is recorded, the
/// offending mutation is skipped and loading continues. Errors that are not
/// constraint violations always propagate.
#[derive(Debug)]
pub struct LoadSession<'g> {
    graph: &'g mut MetaGraph,
    mode: ViolationMode,
    violations: Vec<ConstraintViolation>,
}

impl MetaGraph {
    /// Open a load session in the given mode.
    pub fn session(&mut self, mode: ViolationMode) -> LoadSession<'_> {
        LoadSession {
            graph: self,
            mode,
            violations: Vec::new(),
        }
    }
}

impl LoadSession<'_> {
    pub fn mode(&self) -> ViolationMode {
        self.mode
    }

    /// Read access to the graph being loaded.
    pub fn graph(&self) -> &MetaGraph {
        self.graph
    }

    /// Violations recorded so far.
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// See [`MetaGraph::attach`]. `None` when a violation was recorded.
    pub fn attach(&mut self, parent: NodeId, type_name: &str, sub_type: &str, name: &str) -> Result<Option<NodeId>> {
        let result = self.graph.attach(parent, type_name, sub_type, name);
        self.absorb(result)
    }

    /// See [`MetaGraph::attribute`]. `None` when a violation was recorded.
    pub fn attribute(
        &mut self,
        parent: NodeId,
        sub_type: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<NodeId>> {
        let result = self.graph.attribute(parent, sub_type, name, value);
        self.absorb(result)
    }

    /// See [`MetaGraph::add_child`]. Returns whether the link was made.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let result = self.graph.add_child(parent, child);
        Ok(self.absorb(result)?.is_some())
    }

    /// See [`MetaGraph::set_value`]. Returns whether the value was applied.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<Value>) -> Result<bool> {
        let result = self.graph.set_value(id, value);
        Ok(self.absorb(result)?.is_some())
    }

    /// End the session, returning every recorded violation.
    pub fn finish(self) -> Vec<ConstraintViolation> {
        debug!(mode = %self.mode, violations = self.violations.len(), "Load session finished");
        self.violations
    }

    fn absorb<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(GraphError::Core(meta_core::Error::Violation(violation)))
                if self.mode == ViolationMode::CollectAll =>
            {
                warn!(constraint = %violation.constraint_id, path = %violation.path, "Recorded violation");
                self.violations.push(*violation);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
