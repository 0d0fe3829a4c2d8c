use meta_core::{
    ATTRIBUTE_TYPE, BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole,
    NodeTemplate, Result,
};
use tracing::debug;

use crate::names::{
    TYPE_FIELD, TYPE_IDENTITY, TYPE_METADATA, TYPE_OBJECT, TYPE_RELATIONSHIP, TYPE_VALIDATOR, TYPE_VIEW,
};

pub const ROOT_PROVIDER: &str = "core";

/// Registers `metadata.base`, the root of every metadata graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootTypeProvider;

impl MetaDataTypeProvider for RootTypeProvider {
    fn provider_id(&self) -> &str {
        ROOT_PROVIDER
    }

    fn priority(&self) -> i32 {
        0
    }

    fn description(&self) -> &str {
        "metadata root type"
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("MetaData", NodeTemplate::new(NodeRole::Root)), |b| {
            b.type_name(TYPE_METADATA)
                .sub_type(BASE_SUBTYPE)
                .description("Root of a metadata graph")
                .optional_child_array(TYPE_OBJECT, "*", "*")
                .optional_child_array(TYPE_FIELD, "*", "*")
                .optional_child_array(ATTRIBUTE_TYPE, "*", "*")
                .optional_child_array(TYPE_VALIDATOR, "*", "*")
                .optional_child_array(TYPE_VIEW, "*", "*")
                .optional_child_array(TYPE_IDENTITY, "*", "*")
                .optional_child_array(TYPE_RELATIONSHIP, "*", "*")
        })?;
        debug!("Registered root metadata type");
        Ok(())
    }
}
