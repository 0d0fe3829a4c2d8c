use meta_core::{
    ATTRIBUTE_TYPE, BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole,
    NodeTemplate, Result,
};
use tracing::debug;

use super::fields::FIELD_PROVIDER;
use super::identities::IDENTITY_PROVIDER;
use super::relationships::RELATIONSHIP_PROVIDER;
use super::validators::VALIDATOR_PROVIDER;
use super::views::VIEW_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{
    ATTR_BOOLEAN, ATTR_STRING, ATTR_STRING_ARRAY, DESCRIPTION, EXTENDS, IMPLEMENTS, IS_ABSTRACT, IS_INTERFACE,
    OBJECT_REF, TYPE_FIELD, TYPE_IDENTITY, TYPE_OBJECT, TYPE_RELATIONSHIP, TYPE_VALIDATOR, TYPE_VIEW,
};

pub const OBJECT_PROVIDER: &str = "objects";

const SUBTYPES: &[Subtype] = &[
    Subtype::new("pojo", "PojoObject"),
    Subtype::new("map", "MappedObject"),
    Subtype::new("value", "ValueObject"),
    Subtype::new("proxy", "ProxyObject"),
];

/// Registers `object.base`, which may hold fields, nested objects,
/// identities, attributes, validators, views and relationships.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectTypesProvider;

impl MetaDataTypeProvider for ObjectTypesProvider {
    fn provider_id(&self) -> &str {
        OBJECT_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        [
            FIELD_PROVIDER,
            VALIDATOR_PROVIDER,
            VIEW_PROVIDER,
            IDENTITY_PROVIDER,
            RELATIONSHIP_PROVIDER,
        ]
        .iter()
        .map(|id| id.to_string())
        .collect()
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("MetaObject", NodeTemplate::new(NodeRole::Object)), |b| {
            b.type_name(TYPE_OBJECT)
                .sub_type(BASE_SUBTYPE)
                .description("Structured type made of fields")
                .optional_attribute(ATTR_BOOLEAN, IS_ABSTRACT)
                .optional_attribute(ATTR_BOOLEAN, IS_INTERFACE)
                .optional_attribute(ATTR_STRING, EXTENDS)
                .optional_attribute_array(ATTR_STRING_ARRAY, IMPLEMENTS)
                .optional_attribute(ATTR_STRING, DESCRIPTION)
                .optional_attribute(ATTR_STRING, TYPE_OBJECT)
                .optional_attribute(ATTR_STRING, OBJECT_REF)
                .optional_child_array(TYPE_FIELD, "*", "*")
                .optional_child_array(TYPE_OBJECT, "*", "*")
                .optional_child_array(TYPE_IDENTITY, "*", "*")
                .optional_child_array(ATTRIBUTE_TYPE, "*", "*")
                .optional_child_array(TYPE_VALIDATOR, "*", "*")
                .optional_child_array(TYPE_VIEW, "*", "*")
        })?;
        register_subtypes(registry, TYPE_OBJECT, NodeRole::Object, SUBTYPES)?;
        debug!(count = SUBTYPES.len(), "Registered object types");
        Ok(())
    }
}
