//! Metadata type registry and constraint enforcement.
//!
//! Callers describe domain object kinds (objects, fields, attributes,
//! validators, views, identities, relationships) as data. Providers register
//! those kinds with a [`MetaDataRegistry`], which resolves single inheritance
//! between types and answers whether a child may be placed under a parent.
//! A two-tier constraint model refines that answer while a metadata graph is
//! built:
//!
//! - **Placement constraints** grant parent/child placements (open policy).
//! - **Validation constraints** check values and names (closed policy).
//!
//! The [`ConstraintEnforcer`] evaluates both in a single pass per mutation.
//! **Relationship constraints** check that references between nodes resolve,
//! after loading.
//!
//! # Example
//!
//! ```
//! use meta_core::{
//!     Binding, DeclareChildren, MetaDataRegistry, NodeRole, NodeTemplate, PlacementConstraint,
//! };
//!
//! let registry = MetaDataRegistry::new();
//! registry
//!     .register_type(Binding::of("Pojo", NodeTemplate::new(NodeRole::Object)), |b| {
//!         b.type_name("object").sub_type("pojo")
//!     })
//!     .unwrap();
//! registry
//!     .add_constraint(
//!         PlacementConstraint::new("object.fields", "objects contain fields")
//!             .parent("object", "*")
//!             .child("field", "*"),
//!     )
//!     .unwrap();
//! assert_eq!(registry.stats().placement_constraints, 1);
//! ```

pub mod binding;
pub mod config;
pub mod constraint;
pub mod definition;
pub mod error;
pub mod logging;
pub mod provider;
pub mod registry;
pub mod requirement;
pub mod type_id;
pub mod value;

pub use binding::{Binding, NodeRole, NodeTemplate};
pub use config::{ConfigStore, RegistryConfig, ViolationMode};
pub use constraint::{
    Candidate, Constraint, ConstraintEnforcer, ConstraintKind, ConstraintViolation, NodePath,
    PLACEMENT_CONSTRAINT_ID, PlacementConstraint, ReferenceResolver, RelationshipConstraint, SiblingScan,
    Target, ValidationConstraint, ValueSource,
};
pub use definition::{DeclareChildren, TypeDefinition, TypeDefinitionBuilder};
pub use error::{Error, Result};
pub use provider::{
    DEFAULT_PRIORITY, LoadReport, ManifestDiscovery, MetaDataTypeProvider, ProviderCatalog,
    ProviderGraph, ProviderLoader, ServiceDiscovery, ServicesManifest, StaticDiscovery,
    TYPE_PROVIDER_SERVICE,
};
pub use registry::{
    EffectiveRequirements, MetaDataRegistry, RegistryStats, RelaxedDuplicates, TypeExtension, global,
};
pub use requirement::{Cardinality, ChildRequirement};
pub use type_id::{ATTRIBUTE_TYPE, BASE_SUBTYPE, NodeKey, Pattern, TypeId, WILDCARD};
pub use value::{Value, ValueKind};
