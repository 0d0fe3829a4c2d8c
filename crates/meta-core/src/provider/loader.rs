use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::provider::{MetaDataTypeProvider, ProviderGraph, ServiceDiscovery};
use crate::registry::MetaDataRegistry;

/// Outcome of a bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Providers whose registrations ran in this call, in execution order.
    pub loaded: Vec<String>,
    /// Providers skipped because the registry had already loaded them.
    pub already_loaded: Vec<String>,
    /// Providers skipped by configuration.
    pub disabled: Vec<String>,
    /// Ids discovered more than once; only the first was kept.
    pub duplicates: Vec<String>,
    /// Types resolved after loading.
    pub type_count: usize,
}

impl LoadReport {
    /// Whether this call changed the registry.
    pub fn is_noop(&self) -> bool {
        self.loaded.is_empty()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded {} providers ({} already loaded, {} disabled), {} types",
            self.loaded.len(),
            self.already_loaded.len(),
            self.disabled.len(),
            self.type_count
        )
    }
}

/// Discovers, orders and runs type providers against a registry.
#[derive(Default)]
pub struct ProviderLoader {
    discoveries: Vec<Box<dyn ServiceDiscovery>>,
    disabled: HashSet<String>,
}

impl ProviderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the `[providers]` section of a configuration.
    pub fn with_config(mut self, config: &RegistryConfig) -> Self {
        self.disabled.extend(config.providers.disabled.iter().cloned());
        self
    }

    /// Add a discovery strategy. Strategies are scanned in the order added.
    pub fn with_discovery(mut self, discovery: impl ServiceDiscovery + 'static) -> Self {
        self.discoveries.push(Box::new(discovery));
        self
    }

    pub fn disable(mut self, provider_id: impl Into<String>) -> Self {
        self.disabled.insert(provider_id.into());
        self
    }

    /// Run every discovered provider not yet loaded into `registry`.
    ///
    /// Runs on the same registry are serialized, so concurrent or repeated
    /// calls execute each provider at most once. Providers may query the
    /// registry while they register but must not start another bootstrap.
    ///
    /// # Errors
    ///
    /// Discovery failures, `Error::MissingProviderDependency`,
    /// `Error::DisabledProviderDependency`, `Error::ProviderCycle`,
    /// `Error::ProviderFailed`, `Error::NestedBootstrap` and any inheritance
    /// error found when resolving the loaded types. A failed run leaves the
    /// registry partially populated and must be treated as fatal.
    pub fn load(&self, registry: &MetaDataRegistry) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let providers = self.discover(&mut report)?;

        {
            let run = registry.begin_bootstrap()?;
            let graph = ProviderGraph::from_providers(
                &providers,
                |id| run.is_loaded(id),
                |id| self.disabled.contains(id),
            )?;
            let order = graph.topological_sort()?;

            for id in order {
                if run.is_loaded(&id) {
                    report.already_loaded.push(id);
                    continue;
                }
                let Some(provider) = providers.iter().find(|p| p.provider_id() == id) else {
                    continue;
                };
                debug!(provider = %id, priority = provider.priority(), "Loading type provider");
                provider
                    .register_types(registry)
                    .map_err(|source| Error::ProviderFailed {
                        provider: id.clone(),
                        source: Box::new(source),
                    })?;
                run.mark_loaded(&id);
                report.loaded.push(id);
            }
        }

        report.type_count = registry.resolve_all()?;
        info!(
            loaded = report.loaded.len(),
            skipped = report.already_loaded.len(),
            types = report.type_count,
            "Provider bootstrap complete"
        );
        Ok(report)
    }

    fn discover(&self, report: &mut LoadReport) -> Result<Vec<Arc<dyn MetaDataTypeProvider>>> {
        let mut seen = HashSet::new();
        let mut providers = Vec::new();
        for discovery in &self.discoveries {
            let found = discovery.discover()?;
            debug!(strategy = discovery.name(), count = found.len(), "Ran provider discovery");
            for provider in found {
                let id = provider.provider_id().to_string();
                if self.disabled.contains(&id) {
                    if !report.disabled.contains(&id) {
                        report.disabled.push(id);
                    }
                    continue;
                }
                if !seen.insert(id.clone()) {
                    warn!(provider = %id, "Duplicate provider id discovered, keeping the first");
                    report.duplicates.push(id);
                    continue;
                }
                providers.push(provider);
            }
        }
        Ok(providers)
    }
}

impl fmt::Debug for ProviderLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategies: Vec<&str> = self.discoveries.iter().map(|d| d.name()).collect();
        f.debug_struct("ProviderLoader")
            .field("discoveries", &strategies)
            .field("disabled", &self.disabled)
            .finish()
    }
}
