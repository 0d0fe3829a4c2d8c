//! Services manifests written to temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use meta_core::TYPE_PROVIDER_SERVICE;
use tempfile::TempDir;

/// A services manifest file that lives as long as this value.
pub struct TestManifest {
    _dir: TempDir,
    path: PathBuf,
}

impl TestManifest {
    /// Write a TOML manifest listing `providers` under the type provider
    /// service.
    pub fn toml(providers: &[&str]) -> Self {
        let list = providers
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        Self::write("services.toml", &format!("[services]\n\"{TYPE_PROVIDER_SERVICE}\" = [{list}]\n"))
    }

    /// Write a YAML manifest listing `providers`.
    pub fn yaml(providers: &[&str]) -> Self {
        let mut content = format!("services:\n  {TYPE_PROVIDER_SERVICE}:\n");
        for provider in providers {
            content.push_str(&format!("    - {provider}\n"));
        }
        Self::write("services.yaml", &content)
    }

    /// Write arbitrary content under `file_name`.
    pub fn write(file_name: &str, content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        fs::write(&path, content).unwrap();
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
