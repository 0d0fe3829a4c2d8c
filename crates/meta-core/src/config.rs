//! Registry configuration and format-agnostic file loading.
//!
//! ```toml
//! [registry]
//! strict_duplicates = true
//!
//! [enforcement]
//! mode = "collect-all"
//!
//! [providers]
//! disabled = ["view-types"]
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Loads serde documents, picking the format from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        // Reject unknown formats before touching the file.
        if !matches!(extension.as_str(), "toml" | "json" | "yaml" | "yml") {
            return Err(Error::UnsupportedFormat { extension });
        }
        let content = std::fs::read_to_string(path)?;
        let parse_error = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string())),
            "json" => serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string())),
            _ => serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string())),
        }
    }
}

/// How a load session reacts to violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationMode {
    /// Stop at the first violation.
    #[default]
    FailFast,
    /// Record every violation and keep going.
    CollectAll,
}

impl fmt::Display for ViolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationMode::FailFast => f.write_str("fail-fast"),
            ViolationMode::CollectAll => f.write_str("collect-all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub strict_duplicates: bool,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            strict_duplicates: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcementSection {
    pub mode: ViolationMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    /// Provider ids the loader skips.
    pub disabled: Vec<String>,
}

/// Top-level registry configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub registry: RegistrySection,
    pub enforcement: EnforcementSection,
    pub providers: ProvidersSection,
}

impl RegistryConfig {
    /// Load configuration from a TOML, JSON or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        ConfigStore::new().load(path)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: "<inline>".into(),
            format: "TOML".into(),
            message: e.to_string(),
        })
    }

    pub fn is_disabled(&self, provider_id: &str) -> bool {
        self.providers.disabled.iter().any(|id| id == provider_id)
    }
}
