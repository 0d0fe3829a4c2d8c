//! Pluggable provider discovery.
//!
//! [`StaticDiscovery`] hands the loader an explicit provider list.
//! [`ManifestDiscovery`] reads services manifests that map a service name to
//! provider ids and builds each provider from a [`ProviderCatalog`]:
//!
//! ```toml
//! [services]
//! "meta.type-provider" = ["core-types", "field-types"]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::provider::MetaDataTypeProvider;

/// Service name under which type providers are listed in a manifest.
pub const TYPE_PROVIDER_SERVICE: &str = "meta.type-provider";

/// A strategy for finding type providers.
pub trait ServiceDiscovery: Send + Sync {
    /// Providers in discovery order.
    fn discover(&self) -> Result<Vec<Arc<dyn MetaDataTypeProvider>>>;

    fn name(&self) -> &str;
}

/// An explicit provider list.
#[derive(Default, Clone)]
pub struct StaticDiscovery {
    providers: Vec<Arc<dyn MetaDataTypeProvider>>,
}

impl StaticDiscovery {
    pub fn new(providers: Vec<Arc<dyn MetaDataTypeProvider>>) -> Self {
        Self { providers }
    }

    pub fn with(mut self, provider: impl MetaDataTypeProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for StaticDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.providers.iter().map(|p| p.provider_id()).collect();
        f.debug_struct("StaticDiscovery").field("providers", &ids).finish()
    }
}

impl ServiceDiscovery for StaticDiscovery {
    fn discover(&self) -> Result<Vec<Arc<dyn MetaDataTypeProvider>>> {
        Ok(self.providers.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

type Constructor = Arc<dyn Fn() -> Arc<dyn MetaDataTypeProvider> + Send + Sync>;

/// Constructors for providers that manifests may name.
#[derive(Default, Clone)]
pub struct ProviderCatalog {
    constructors: BTreeMap<String, Constructor>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `id`, replacing any previous one.
    pub fn register<F>(&mut self, id: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn MetaDataTypeProvider> + Send + Sync + 'static,
    {
        self.constructors.insert(id.into(), Arc::new(constructor));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    /// Known ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn build(&self, id: &str) -> Result<Arc<dyn MetaDataTypeProvider>> {
        self.constructors
            .get(id)
            .map(|construct| construct())
            .ok_or_else(|| Error::UnknownProvider { id: id.to_string() })
    }
}

impl fmt::Debug for ProviderCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCatalog").field("ids", &self.ids()).finish()
    }
}

/// Contents of a services manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesManifest {
    #[serde(default)]
    pub services: BTreeMap<String, Vec<String>>,
}

impl ServicesManifest {
    /// Read a manifest; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        ConfigStore::new().load(path)
    }

    /// Provider ids listed for the type provider service.
    pub fn type_providers(&self) -> &[String] {
        self.services
            .get(TYPE_PROVIDER_SERVICE)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Discovery through services manifests resolved against a catalog.
#[derive(Debug, Clone)]
pub struct ManifestDiscovery {
    catalog: ProviderCatalog,
    paths: Vec<PathBuf>,
    inline: Vec<ServicesManifest>,
}

impl ManifestDiscovery {
    pub fn new(catalog: ProviderCatalog) -> Self {
        Self {
            catalog,
            paths: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// Add a manifest file, read at discovery time.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Add an in-memory manifest, scanned after all files.
    pub fn with_manifest(mut self, manifest: ServicesManifest) -> Self {
        self.inline.push(manifest);
        self
    }
}

impl ServiceDiscovery for ManifestDiscovery {
    fn discover(&self) -> Result<Vec<Arc<dyn MetaDataTypeProvider>>> {
        let mut manifests = Vec::with_capacity(self.paths.len() + self.inline.len());
        for path in &self.paths {
            manifests.push(ServicesManifest::load(path)?);
        }
        manifests.extend(self.inline.iter().cloned());

        let mut providers = Vec::new();
        for manifest in &manifests {
            for id in manifest.type_providers() {
                providers.push(self.catalog.build(id)?);
            }
        }
        debug!(count = providers.len(), manifests = manifests.len(), "Discovered providers from manifests");
        Ok(providers)
    }

    fn name(&self) -> &str {
        "manifest"
    }
}
