//! Built-in metadata types.
//!
//! Providers for the standard type families (the `metadata.base` root,
//! attributes, fields, validators, views, identities, relationships and
//! objects) plus the core constraint set. [`bootstrap`] loads all of them into
//! a registry in dependency order.
//!
//! ```
//! use meta_core::MetaDataRegistry;
//!
//! let registry = MetaDataRegistry::new();
//! let report = meta_builtins::bootstrap(&registry).unwrap();
//! assert_eq!(report.loaded.len(), meta_builtins::BUILTIN_COUNT);
//! assert!(registry.accepts_child("field", "string", "attr", "int", "maxLength").unwrap());
//! ```

pub mod names;
pub mod providers;

use std::sync::Arc;

use meta_core::{
    LoadReport, ManifestDiscovery, MetaDataRegistry, ProviderLoader, RegistryConfig, Result, StaticDiscovery,
};
use tracing::info;

pub use providers::{
    AttributeTypesProvider, BUILTIN_COUNT, CoreConstraintsProvider, FieldTypesProvider, IdentityTypesProvider,
    ObjectTypesProvider, RelationshipTypesProvider, RootTypeProvider, ValidatorTypesProvider, ViewTypesProvider,
    builtin_providers, catalog,
};

/// A loader that discovers every built-in provider.
pub fn loader() -> ProviderLoader {
    ProviderLoader::new().with_discovery(StaticDiscovery::new(builtin_providers()))
}

/// Load every built-in provider into `registry`.
pub fn bootstrap(registry: &MetaDataRegistry) -> Result<LoadReport> {
    loader().load(registry)
}

/// Load the built-in providers listed in a services manifest, honouring the
/// configuration's disabled list.
pub fn bootstrap_from_manifest(
    registry: &MetaDataRegistry,
    manifest: &std::path::Path,
    config: &RegistryConfig,
) -> Result<LoadReport> {
    ProviderLoader::new()
        .with_config(config)
        .with_discovery(ManifestDiscovery::new(catalog()).with_path(manifest))
        .load(registry)
}

/// Bootstrap the process-default registry and return it.
///
/// Safe to call from several entry points; each provider runs once.
pub fn init_global() -> Result<Arc<MetaDataRegistry>> {
    let registry = meta_core::global();
    let report = bootstrap(&registry)?;
    if !report.is_noop() {
        info!(%report, "Process registry ready");
    }
    Ok(registry)
}
