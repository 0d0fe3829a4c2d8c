//! Type providers and the bootstrap protocol that loads them.
//!
//! A provider is a unit of startup code that registers types and constraints.
//! Providers are found through a [`ServiceDiscovery`], ordered by declared
//! dependencies (priority breaks ties) and run at most once per registry by
//! [`ProviderLoader`].

mod dependency;
mod discovery;
mod loader;

pub use dependency::ProviderGraph;
pub use discovery::{
    ManifestDiscovery, ProviderCatalog, ServiceDiscovery, ServicesManifest, StaticDiscovery,
    TYPE_PROVIDER_SERVICE,
};
pub use loader::{LoadReport, ProviderLoader};

use crate::error::Result;
use crate::registry::MetaDataRegistry;

/// Priority given to providers that do not declare one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A source of type and constraint registrations.
pub trait MetaDataTypeProvider: Send + Sync {
    /// Stable identifier other providers depend on.
    fn provider_id(&self) -> &str;

    /// Ids of providers that must be loaded first.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Lower runs earlier among providers whose order is otherwise free.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn description(&self) -> &str {
        ""
    }

    /// Register this provider's types and constraints.
    ///
    /// Runs while the loader holds the registry's bootstrap state, so it must
    /// not query provider load state itself.
    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()>;
}
