use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Snapshot of registry contents for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RegistryStats {
    pub type_count: usize,
    /// Registered subtypes per primary type, e.g. `field -> 9`.
    pub types_by_primary: BTreeMap<String, usize>,
    pub placement_constraints: usize,
    pub validation_constraints: usize,
    pub relationship_constraints: usize,
    /// Types whose effective requirements are currently cached.
    pub cached_resolutions: usize,
    pub loaded_providers: Vec<String>,
}

impl RegistryStats {
    pub fn constraint_count(&self) -> usize {
        self.placement_constraints + self.validation_constraints + self.relationship_constraints
    }
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} types, {} constraints ({} placement, {} validation, {} relationship), {} providers",
            self.type_count,
            self.constraint_count(),
            self.placement_constraints,
            self.validation_constraints,
            self.relationship_constraints,
            self.loaded_providers.len()
        )?;
        for (primary, count) in &self.types_by_primary {
            write!(f, "\n  {primary}: {count}")?;
        }
        Ok(())
    }
}
