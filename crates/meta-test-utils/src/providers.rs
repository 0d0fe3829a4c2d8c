//! Providers that record what they did.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use meta_core::{Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole, NodeTemplate, Result};
use parking_lot::Mutex;

/// Shared, ordered record of provider invocations.
#[derive(Debug, Clone, Default)]
pub struct ProviderLog(Arc<Mutex<Vec<String>>>);

impl ProviderLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    /// Entries in invocation order.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Registers `<id>.base` (inheriting from its first dependency's type) and
/// logs each call.
#[derive(Debug, Clone)]
pub struct RecordingProvider {
    id: String,
    dependencies: Vec<String>,
    priority: i32,
    log: ProviderLog,
    calls: Arc<AtomicUsize>,
}

impl RecordingProvider {
    pub fn new(id: impl Into<String>, log: &ProviderLog) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
            priority: meta_core::DEFAULT_PRIORITY,
            log: log.clone(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Shared counter of `register_types` calls, valid after the provider
    /// is moved into a discovery.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetaDataTypeProvider for RecordingProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push(self.id.as_str());
        let parent = self.dependencies.first();
        registry.register_type(Binding::of(self.id.as_str(), NodeTemplate::new(NodeRole::Other)), |b| {
            let b = b
                .type_name(self.id.as_str())
                .sub_type("base")
                .optional_child(self.id.as_str(), "*", "*");
            match parent {
                Some(dep) => b.inherits_from(dep.as_str(), "base"),
                None => b,
            }
        })?;
        Ok(())
    }
}

/// A provider whose registration is always incomplete.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingProvider;

impl MetaDataTypeProvider for FailingProvider {
    fn provider_id(&self) -> &str {
        "failing"
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("Failing", NodeTemplate::new(NodeRole::Other)), |b| {
            b.type_name("failing")
        })?;
        Ok(())
    }
}
