//! Shared test utilities for the metadata registry workspace.
//!
//! Dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`fixtures`]: isolated registries pre-populated with small type sets
//! - [`providers`]: providers that record or fail their registration
//! - [`manifest`]: services manifest files in temporary directories

pub mod fixtures;
pub mod manifest;
pub mod providers;

pub use fixtures::{chain_registry, fresh_registry, object_registry};
pub use manifest::TestManifest;
pub use providers::{FailingProvider, ProviderLog, RecordingProvider};
