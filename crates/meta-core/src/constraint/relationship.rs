use std::fmt;
use std::sync::Arc;

use crate::constraint::Target;
use crate::constraint::rules::{Rejection, RuleResult};
use crate::type_id::NodeKey;
use crate::value::Value;

/// Lookup of the nodes a reference may point at.
pub trait ReferenceResolver {
    /// The first attached node matching `target` and named `reference`.
    fn resolve(&self, reference: &str, target: &Target) -> Option<NodeKey<'_>>;
}

type Predicate = dyn Fn(&NodeKey<'_>, &NodeKey<'_>) -> bool + Send + Sync;

/// Cross-reference check between a node whose value names another node and
/// the node it names.
///
/// Unlike placement and validation constraints these are not evaluated per
/// mutation: references may point forward, so they are checked against a
/// fully loaded graph.
#[derive(Clone)]
pub struct RelationshipConstraint {
    id: String,
    description: String,
    source: Target,
    target: Target,
    require_target: bool,
    predicate: Option<(String, Arc<Predicate>)>,
}

impl RelationshipConstraint {
    /// Nodes matching `source` must name a node matching `target`.
    pub fn new(id: impl Into<String>, source: Target, target: Target) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            source,
            target,
            require_target: true,
            predicate: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Let references that resolve to nothing pass.
    pub fn optional_target(mut self) -> Self {
        self.require_target = false;
        self
    }

    /// Further test each resolved `(source, target)` pair.
    pub fn verify<F>(mut self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&NodeKey<'_>, &NodeKey<'_>) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some((message.into(), Arc::new(predicate)));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &Target {
        &self.source
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_target_required(&self) -> bool {
        self.require_target
    }

    pub fn applies_to(&self, key: &NodeKey<'_>) -> bool {
        self.source.matches(key)
    }

    /// Check every reference held in `value`. A string array holds one
    /// reference per element; a missing or blank value references nothing.
    pub fn check(&self, key: &NodeKey<'_>, value: Option<&Value>, resolver: &dyn ReferenceResolver) -> RuleResult {
        for reference in references(value) {
            let Some(resolved) = resolver.resolve(&reference, &self.target) else {
                if self.require_target {
                    return Err(Rejection::new(format!(
                        "'{reference}' does not name any {}",
                        self.target
                    )));
                }
                continue;
            };
            if let Some((message, predicate)) = &self.predicate {
                if !predicate(key, &resolved) {
                    return Err(Rejection::new(format!("{message} ('{reference}' is {resolved})")));
                }
            }
        }
        Ok(())
    }
}

fn references(value: Option<&Value>) -> Vec<String> {
    let names = match value {
        None => Vec::new(),
        Some(Value::StringArray(items)) => items.clone(),
        Some(other) => vec![other.to_string()],
    };
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

impl fmt::Debug for RelationshipConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipConstraint")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("require_target", &self.require_target)
            .field("predicate", &self.predicate.as_ref().map(|(message, _)| message))
            .finish()
    }
}
