use crate::definition::DeclareChildren;
use crate::error::Result;
use crate::registry::MetaDataRegistry;
use crate::requirement::ChildRequirement;
use crate::type_id::TypeId;

/// Pending additions to an already registered type.
///
/// Nothing changes until [`apply`](Self::apply) is called.
#[derive(Debug)]
#[must_use = "an extension does nothing until applied"]
pub struct TypeExtension<'r> {
    registry: &'r MetaDataRegistry,
    type_id: TypeId,
    additions: Vec<ChildRequirement>,
}

impl<'r> TypeExtension<'r> {
    pub(crate) fn new(registry: &'r MetaDataRegistry, type_id: TypeId) -> Self {
        Self {
            registry,
            type_id,
            additions: Vec::new(),
        }
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn additions(&self) -> &[ChildRequirement] {
        &self.additions
    }

    /// Commit the additions to the registry.
    pub fn apply(self) -> Result<()> {
        self.registry.apply_extension(&self.type_id, self.additions)
    }
}

impl DeclareChildren for TypeExtension<'_> {
    fn child(mut self, requirement: ChildRequirement) -> Self {
        self.additions.push(requirement);
        self
    }
}
