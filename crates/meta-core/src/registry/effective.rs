//! Inheritance-resolved child requirements.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::definition::TypeDefinition;
use crate::error::{Error, Result};
use crate::requirement::ChildRequirement;
use crate::type_id::{NodeKey, TypeId};

/// Requirements of a type merged with those of its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveRequirements {
    type_id: TypeId,
    /// Self first, then each ancestor up to the root.
    chain: Vec<TypeId>,
    inherited: Vec<ChildRequirement>,
    effective: Vec<ChildRequirement>,
}

impl EffectiveRequirements {
    /// Merge requirements along a resolved chain, closest declaration first.
    pub(crate) fn from_chain(type_id: TypeId, chain: &[Arc<TypeDefinition>]) -> Self {
        let effective = merge(chain);
        let inherited = merge(chain.get(1..).unwrap_or_default());
        Self {
            type_id,
            chain: chain.iter().map(|d| d.type_id().clone()).collect(),
            inherited,
            effective,
        }
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    /// The resolved parent chain, starting with the type itself.
    pub fn chain(&self) -> &[TypeId] {
        &self.chain
    }

    /// Inheritance depth; a root type has depth 0.
    pub fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// Direct requirements followed by inherited ones not overridden.
    pub fn requirements(&self) -> &[ChildRequirement] {
        &self.effective
    }

    /// Requirements contributed by ancestors only.
    pub fn inherited(&self) -> &[ChildRequirement] {
        &self.inherited
    }

    pub fn accepts(&self, key: &NodeKey<'_>) -> bool {
        self.effective.iter().any(|r| r.matches_key(key))
    }

    /// The most specific matching requirement: fewest wildcard segments, then
    /// closest declaration.
    pub fn find(&self, key: &NodeKey<'_>) -> Option<&ChildRequirement> {
        self.effective
            .iter()
            .filter(|r| r.matches_key(key))
            .min_by_key(|r| wildcard_count(r))
    }

    pub fn required(&self) -> impl Iterator<Item = &ChildRequirement> {
        self.effective.iter().filter(|r| r.required)
    }
}

fn wildcard_count(req: &ChildRequirement) -> usize {
    [&req.child_type, &req.child_sub_type, &req.name]
        .iter()
        .filter(|p| p.is_wildcard())
        .count()
}

fn merge(chain: &[Arc<TypeDefinition>]) -> Vec<ChildRequirement> {
    let mut merged: Vec<ChildRequirement> = Vec::new();
    for def in chain {
        for req in def.direct_requirements() {
            if !merged.iter().any(|m| m.key() == req.key()) {
                merged.push(req.clone());
            }
        }
    }
    merged
}

/// Walk the parent chain of `type_id` iteratively.
///
/// Returns `Ok(None)` when `type_id` itself is not registered.
pub(crate) fn resolve_chain(
    types: &HashMap<TypeId, Arc<TypeDefinition>>,
    type_id: &TypeId,
) -> Result<Option<Vec<Arc<TypeDefinition>>>> {
    let Some(start) = types.get(type_id) else {
        return Ok(None);
    };
    let mut chain = vec![Arc::clone(start)];
    let mut seen: HashSet<&TypeId> = HashSet::from([type_id]);
    let mut current = start.parent();

    while let Some(parent) = current {
        if !seen.insert(parent) {
            let mut names: Vec<String> = chain.iter().map(|d| d.type_id().to_string()).collect();
            names.push(parent.to_string());
            return Err(Error::InheritanceCycle {
                chain: names.join(" -> "),
            });
        }
        let child = chain.last().map(|d| d.type_id().clone()).unwrap_or_else(|| type_id.clone());
        let def = types.get(parent).ok_or_else(|| Error::UnresolvedParent {
            type_id: child,
            parent: parent.clone(),
        })?;
        chain.push(Arc::clone(def));
        current = def.parent();
    }
    Ok(Some(chain))
}
