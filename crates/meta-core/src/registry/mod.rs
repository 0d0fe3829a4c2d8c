//! The metadata type registry.
//!
//! Holds every registered [`TypeDefinition`] keyed by [`TypeId`], the ordered
//! constraint list, the per-type cache of resolved inheritance and the load
//! state of type providers. All methods take `&self`; a registry is meant to
//! be shared behind an `Arc` once bootstrap has run.
//!
//! # Example
//!
//! ```
//! use meta_core::{Binding, DeclareChildren, MetaDataRegistry, NodeRole, NodeTemplate};
//!
//! let registry = MetaDataRegistry::new();
//! let binding = Binding::of("Field", NodeTemplate::new(NodeRole::Field));
//! registry
//!     .register_type(binding.clone(), |b| {
//!         b.type_name("field").sub_type("base").optional_attribute("boolean", "required")
//!     })
//!     .unwrap();
//! registry
//!     .register_type(binding, |b| {
//!         b.type_name("field")
//!             .sub_type("string")
//!             .inherits_from("field", "base")
//!             .optional_attribute("int", "maxLength")
//!     })
//!     .unwrap();
//!
//! assert!(registry.accepts_child("field", "string", "attr", "boolean", "required").unwrap());
//! assert!(registry.accepts_child("field", "string", "attr", "int", "maxLength").unwrap());
//! ```

mod effective;
mod extension;
mod stats;

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use tracing::{debug, warn};

pub use effective::EffectiveRequirements;
pub use extension::TypeExtension;
pub use stats::RegistryStats;

use crate::binding::{Binding, NodeTemplate};
use crate::config::RegistryConfig;
use crate::constraint::Constraint;
use crate::definition::{TypeDefinition, TypeDefinitionBuilder};
use crate::error::{Error, Result};
use crate::requirement::ChildRequirement;
use crate::type_id::{NodeKey, TypeId};

/// Registry of metadata types and constraints.
#[derive(Debug)]
pub struct MetaDataRegistry {
    types: RwLock<HashMap<TypeId, Arc<TypeDefinition>>>,
    constraints: RwLock<Arc<[Constraint]>>,
    effective: RwLock<HashMap<TypeId, Arc<EffectiveRequirements>>>,
    strict_duplicates: bool,
    relaxed: AtomicUsize,
    /// Serializes bootstrap runs. The flag is set while a run is in progress
    /// so a provider starting another run on the same thread fails instead
    /// of re-entering.
    bootstrap: ReentrantMutex<Cell<bool>>,
    /// Ids of providers that completed registration, in load order.
    providers: RwLock<Vec<String>>,
}

impl Default for MetaDataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaDataRegistry {
    /// Create an empty registry with strict duplicate detection.
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
            constraints: RwLock::new(Arc::from(Vec::<Constraint>::new())),
            effective: RwLock::new(HashMap::new()),
            strict_duplicates: true,
            relaxed: AtomicUsize::new(0),
            bootstrap: ReentrantMutex::new(Cell::new(false)),
            providers: RwLock::new(Vec::new()),
        }
    }

    /// Create an empty registry configured by `config`.
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            strict_duplicates: config.registry.strict_duplicates,
            ..Self::new()
        }
    }

    /// Whether duplicate types and constraint ids are currently rejected.
    pub fn is_strict(&self) -> bool {
        self.strict_duplicates && self.relaxed.load(Ordering::Acquire) == 0
    }

    /// Allow duplicates to silently replace existing entries while the
    /// returned guard is alive. Guards nest.
    pub fn relax_duplicate_detection(&self) -> RelaxedDuplicates<'_> {
        self.relaxed.fetch_add(1, Ordering::AcqRel);
        RelaxedDuplicates { registry: self }
    }

    // ----- registration -----

    /// Declare and register a type.
    ///
    /// # Errors
    ///
    /// Fails when the builder is incomplete, the type names itself as parent,
    /// or the `(type, subType)` pair is already registered in strict mode.
    pub fn register_type<F>(&self, binding: Binding, declare: F) -> Result<TypeId>
    where
        F: FnOnce(TypeDefinitionBuilder) -> TypeDefinitionBuilder,
    {
        let definition = declare(TypeDefinitionBuilder::new()).build(binding)?;
        self.register(definition)
    }

    /// Register a prebuilt definition.
    pub fn register(&self, definition: TypeDefinition) -> Result<TypeId> {
        let type_id = definition.type_id().clone();
        let replaced = {
            let mut types = self.types.write();
            if let Some(existing) = types.get(&type_id) {
                if self.is_strict() {
                    return Err(Error::DuplicateType {
                        type_id,
                        existing: existing.binding().name().to_string(),
                        new: definition.binding().name().to_string(),
                    });
                }
                warn!(type_id = %type_id, binding = definition.binding().name(), "Overriding registered type");
            }
            types.insert(type_id.clone(), Arc::new(definition)).is_some()
        };
        if replaced {
            self.effective.write().clear();
        }
        debug!(type_id = %type_id, "Registered type");
        Ok(type_id)
    }

    /// Register a constraint.
    ///
    /// Constraints are evaluated in registration order.
    pub fn add_constraint(&self, constraint: impl Into<Constraint>) -> Result<()> {
        let constraint = constraint.into();
        if constraint.id().trim().is_empty() {
            return Err(Error::InvalidConstraint {
                id: constraint.id().to_string(),
                reason: "constraint id must not be blank".into(),
            });
        }
        let mut guard = self.constraints.write();
        let mut list: Vec<Constraint> = guard.iter().cloned().collect();
        match list.iter().position(|c| c.id() == constraint.id()) {
            Some(_) if self.is_strict() => {
                return Err(Error::DuplicateConstraint {
                    id: constraint.id().to_string(),
                });
            }
            Some(index) => {
                warn!(id = constraint.id(), "Overriding registered constraint");
                list[index] = constraint;
            }
            None => {
                debug!(id = constraint.id(), kind = %constraint.kind(), "Registered constraint");
                list.push(constraint);
            }
        }
        *guard = Arc::from(list);
        Ok(())
    }

    /// Immutable snapshot of all constraints in registration order.
    pub fn constraints(&self) -> Arc<[Constraint]> {
        Arc::clone(&self.constraints.read())
    }

    pub fn constraint(&self, id: &str) -> Option<Constraint> {
        self.constraints.read().iter().find(|c| c.id() == id).cloned()
    }

    // ----- lookups -----

    /// The definition for `type_name.sub_type`, or `None` if unregistered.
    pub fn type_definition(&self, type_name: &str, sub_type: &str) -> Option<Arc<TypeDefinition>> {
        self.definition(&TypeId::new(type_name, sub_type))
    }

    pub fn definition(&self, type_id: &TypeId) -> Option<Arc<TypeDefinition>> {
        self.types.read().get(type_id).cloned()
    }

    pub fn contains(&self, type_id: &TypeId) -> bool {
        self.types.read().contains_key(type_id)
    }

    /// Whether any subtype of `type_name` is registered.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.read().keys().any(|id| id.type_name() == type_name)
    }

    /// All registered type ids, sorted.
    pub fn type_ids(&self) -> Vec<TypeId> {
        let mut ids: Vec<TypeId> = self.types.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All definitions, sorted by type id.
    pub fn definitions(&self) -> Vec<Arc<TypeDefinition>> {
        let mut defs: Vec<Arc<TypeDefinition>> = self.types.read().values().cloned().collect();
        defs.sort_by(|a, b| a.type_id().cmp(b.type_id()));
        defs
    }

    /// Registered subtypes of `type_name`, sorted.
    pub fn subtypes_of(&self, type_name: &str) -> Vec<String> {
        let mut subs: Vec<String> = self
            .types
            .read()
            .keys()
            .filter(|id| id.type_name() == type_name)
            .map(|id| id.sub_type().to_string())
            .collect();
        subs.sort();
        subs
    }

    /// The first type (by id) backed by the named binding.
    pub fn find_by_binding(&self, binding_name: &str) -> Option<Arc<TypeDefinition>> {
        self.definitions()
            .into_iter()
            .find(|d| d.binding().name() == binding_name)
    }

    fn unknown_type(&self, type_id: TypeId) -> Error {
        let subs = self.subtypes_of(type_id.type_name());
        let available = if subs.is_empty() {
            "none".to_string()
        } else {
            subs.iter()
                .map(|s| format!("{}.{s}", type_id.type_name()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        Error::UnknownType { type_id, available }
    }

    /// The definition for a type that must exist.
    pub fn require(&self, type_id: &TypeId) -> Result<Arc<TypeDefinition>> {
        self.definition(type_id)
            .ok_or_else(|| self.unknown_type(type_id.clone()))
    }

    // ----- inheritance -----

    /// Resolve a type's effective requirements, caching the result.
    ///
    /// Returns `Ok(None)` for an unregistered type.
    ///
    /// # Errors
    ///
    /// `Error::UnresolvedParent` when an ancestor is not registered and
    /// `Error::InheritanceCycle` when the parent chain loops.
    pub fn effective_requirements(
        &self,
        type_name: &str,
        sub_type: &str,
    ) -> Result<Option<Arc<EffectiveRequirements>>> {
        self.resolve(&TypeId::new(type_name, sub_type))
    }

    pub(crate) fn resolve(&self, type_id: &TypeId) -> Result<Option<Arc<EffectiveRequirements>>> {
        if let Some(cached) = self.effective.read().get(type_id) {
            return Ok(Some(Arc::clone(cached)));
        }
        // Writers replace definitions under `types` and clear the cache after,
        // so the read guard must outlive the insert.
        let types = self.types.read();
        let resolved = match effective::resolve_chain(&types, type_id)? {
            Some(chain) => Arc::new(EffectiveRequirements::from_chain(type_id.clone(), &chain)),
            None => return Ok(None),
        };
        let mut cache = self.effective.write();
        let entry = cache.entry(type_id.clone()).or_insert(resolved);
        Ok(Some(Arc::clone(entry)))
    }

    /// Requirements a type inherits from its ancestors. Empty for an
    /// unregistered type.
    pub fn inherited_requirements(&self, type_name: &str, sub_type: &str) -> Result<Vec<ChildRequirement>> {
        Ok(self
            .effective_requirements(type_name, sub_type)?
            .map(|e| e.inherited().to_vec())
            .unwrap_or_default())
    }

    /// Whether a child may be placed under a parent type according to the
    /// parent's effective requirements. An unregistered parent accepts nothing.
    pub fn accepts_child(
        &self,
        parent_type: &str,
        parent_sub_type: &str,
        child_type: &str,
        child_sub_type: &str,
        child_name: &str,
    ) -> Result<bool> {
        let key = NodeKey::new(child_type, child_sub_type, child_name);
        Ok(self
            .effective_requirements(parent_type, parent_sub_type)?
            .is_some_and(|e| e.accepts(&key)))
    }

    /// The most specific requirement admitting the child, if any.
    pub fn child_requirement(
        &self,
        parent_type: &str,
        parent_sub_type: &str,
        child_type: &str,
        child_sub_type: &str,
        child_name: &str,
    ) -> Result<Option<ChildRequirement>> {
        let key = NodeKey::new(child_type, child_sub_type, child_name);
        Ok(self
            .effective_requirements(parent_type, parent_sub_type)?
            .and_then(|e| e.find(&key).cloned()))
    }

    /// Required requirements of a type not satisfied by any of `present`.
    pub fn missing_required_children(
        &self,
        type_name: &str,
        sub_type: &str,
        present: &[NodeKey<'_>],
    ) -> Result<Vec<ChildRequirement>> {
        let Some(effective) = self.effective_requirements(type_name, sub_type)? else {
            return Ok(Vec::new());
        };
        Ok(effective
            .required()
            .filter(|req| !present.iter().any(|key| req.matches_key(key)))
            .cloned()
            .collect())
    }

    /// Human-readable list of what a type accepts, for error messages.
    pub fn supported_children_description(&self, type_name: &str, sub_type: &str) -> String {
        match self.effective_requirements(type_name, sub_type) {
            Ok(Some(effective)) if effective.requirements().is_empty() => "none".into(),
            Ok(Some(effective)) => effective
                .requirements()
                .iter()
                .map(ChildRequirement::describe)
                .collect::<Vec<_>>()
                .join("; "),
            Ok(None) => format!("unknown type {type_name}.{sub_type}"),
            Err(e) => format!("unresolvable ({e})"),
        }
    }

    /// Resolve every registered type, failing on the first broken chain.
    ///
    /// Returns the number of resolved types.
    pub fn resolve_all(&self) -> Result<usize> {
        let ids = self.type_ids();
        for id in &ids {
            self.resolve(id)?;
        }
        debug!(count = ids.len(), "Resolved type inheritance");
        Ok(ids.len())
    }

    // ----- extension -----

    /// Begin extending a registered type.
    ///
    /// ```
    /// use meta_core::{Binding, DeclareChildren, MetaDataRegistry, NodeRole, NodeTemplate};
    ///
    /// let registry = MetaDataRegistry::new();
    /// registry
    ///     .register_type(Binding::of("Field", NodeTemplate::new(NodeRole::Field)), |b| {
    ///         b.type_name("field").sub_type("string")
    ///     })
    ///     .unwrap();
    /// registry
    ///     .find_type("field", "string")
    ///     .unwrap()
    ///     .optional_attribute("string", "dbColumn")
    ///     .apply()
    ///     .unwrap();
    /// assert!(registry.accepts_child("field", "string", "attr", "string", "dbColumn").unwrap());
    /// ```
    pub fn find_type(&self, type_name: &str, sub_type: &str) -> Result<TypeExtension<'_>> {
        let type_id = TypeId::new(type_name, sub_type);
        if !self.contains(&type_id) {
            return Err(self.unknown_type(type_id));
        }
        Ok(TypeExtension::new(self, type_id))
    }

    /// Extend the type backed by `binding_name`.
    pub fn extend_binding<F>(&self, binding_name: &str, declare: F) -> Result<()>
    where
        F: for<'r> FnOnce(TypeExtension<'r>) -> TypeExtension<'r>,
    {
        let definition = self
            .find_by_binding(binding_name)
            .ok_or_else(|| Error::UnknownBinding {
                binding: binding_name.to_string(),
            })?;
        declare(TypeExtension::new(self, definition.type_id().clone())).apply()
    }

    pub(crate) fn apply_extension(&self, type_id: &TypeId, additions: Vec<ChildRequirement>) -> Result<()> {
        if additions.is_empty() {
            return Ok(());
        }
        let count = additions.len();
        {
            let mut types = self.types.write();
            let Some(current) = types.get(type_id) else {
                drop(types);
                return Err(self.unknown_type(type_id.clone()));
            };
            let extended = current.extended(additions);
            types.insert(type_id.clone(), Arc::new(extended));
        }
        self.effective.write().clear();
        debug!(type_id = %type_id, count, "Extended type");
        Ok(())
    }

    // ----- construction -----

    /// Run the binding factory of a registered type.
    pub fn create_template(&self, type_name: &str, sub_type: &str, name: &str) -> Result<NodeTemplate> {
        let type_id = TypeId::new(type_name, sub_type);
        let definition = self.require(&type_id)?;
        Ok(definition.binding().instantiate(&type_id, name))
    }

    // ----- provider state -----

    pub fn is_provider_loaded(&self, provider_id: &str) -> bool {
        self.providers.read().iter().any(|id| id == provider_id)
    }

    /// Provider ids in the order they were loaded.
    pub fn loaded_providers(&self) -> Vec<String> {
        self.providers.read().clone()
    }

    /// Start a bootstrap run, waiting for any run on another thread.
    ///
    /// The registry stays fully usable from the running providers; only a
    /// second run is excluded.
    ///
    /// # Errors
    ///
    /// `Error::NestedBootstrap` when called from inside a run on this
    /// registry, e.g. by a provider's `register_types`.
    pub(crate) fn begin_bootstrap(&self) -> Result<BootstrapRun<'_>> {
        let guard = self.bootstrap.lock();
        if guard.replace(true) {
            return Err(Error::NestedBootstrap);
        }
        Ok(BootstrapRun { registry: self, guard })
    }

    // ----- maintenance -----

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats::default();
        {
            let types = self.types.read();
            stats.type_count = types.len();
            for id in types.keys() {
                *stats.types_by_primary.entry(id.type_name().to_string()).or_default() += 1;
            }
        }
        for constraint in self.constraints().iter() {
            match constraint {
                Constraint::Placement(_) => stats.placement_constraints += 1,
                Constraint::Validation(_) => stats.validation_constraints += 1,
                Constraint::Relationship(_) => stats.relationship_constraints += 1,
            }
        }
        stats.cached_resolutions = self.effective.read().len();
        stats.loaded_providers = self.loaded_providers();
        stats
    }

    /// Remove every type, constraint, cached resolution and provider mark.
    pub fn clear(&self) {
        self.types.write().clear();
        *self.constraints.write() = Arc::from(Vec::<Constraint>::new());
        self.effective.write().clear();
        self.providers.write().clear();
        debug!("Cleared registry");
    }
}

/// Scope guard returned by [`MetaDataRegistry::relax_duplicate_detection`].
#[derive(Debug)]
#[must_use = "duplicate detection is restored as soon as the guard is dropped"]
pub struct RelaxedDuplicates<'r> {
    registry: &'r MetaDataRegistry,
}

impl Drop for RelaxedDuplicates<'_> {
    fn drop(&mut self) {
        self.registry.relaxed.fetch_sub(1, Ordering::AcqRel);
    }
}

/// An exclusive bootstrap run, released on drop.
pub(crate) struct BootstrapRun<'r> {
    registry: &'r MetaDataRegistry,
    guard: ReentrantMutexGuard<'r, Cell<bool>>,
}

impl BootstrapRun<'_> {
    pub(crate) fn is_loaded(&self, provider_id: &str) -> bool {
        self.registry.is_provider_loaded(provider_id)
    }

    pub(crate) fn mark_loaded(&self, provider_id: &str) {
        self.registry.providers.write().push(provider_id.to_string());
    }
}

impl Drop for BootstrapRun<'_> {
    fn drop(&mut self) {
        self.guard.set(false);
    }
}

static GLOBAL: OnceLock<Arc<MetaDataRegistry>> = OnceLock::new();

/// The process-default registry, created empty on first use.
///
/// Every API also accepts an explicit registry; prefer that in tests.
pub fn global() -> Arc<MetaDataRegistry> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(MetaDataRegistry::new())))
}
