use meta_core::{
    BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole, NodeTemplate, Result,
};

use super::attributes::ATTRIBUTE_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{ATTR_STRING, ATTR_STRING_ARRAY, DESCRIPTION, FIELDS, GENERATION, TYPE_IDENTITY};

pub const IDENTITY_PROVIDER: &str = "identities";

const SUBTYPES: &[Subtype] = &[
    Subtype::new("primary", "PrimaryIdentity"),
    Subtype::new("secondary", "SecondaryIdentity"),
];

/// Registers `identity.base` with its primary and secondary keys. Every
/// identity names the fields it is made of.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTypesProvider;

impl MetaDataTypeProvider for IdentityTypesProvider {
    fn provider_id(&self) -> &str {
        IDENTITY_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![ATTRIBUTE_PROVIDER.to_string()]
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("MetaIdentity", NodeTemplate::new(NodeRole::Identity)), |b| {
            b.type_name(TYPE_IDENTITY)
                .sub_type(BASE_SUBTYPE)
                .description("Key made of one or more fields")
                .required_attribute(ATTR_STRING_ARRAY, FIELDS)
                .optional_attribute(ATTR_STRING, GENERATION)
                .optional_attribute(ATTR_STRING, DESCRIPTION)
        })?;
        register_subtypes(registry, TYPE_IDENTITY, NodeRole::Identity, SUBTYPES)
    }
}
