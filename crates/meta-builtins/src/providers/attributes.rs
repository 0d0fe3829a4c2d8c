use meta_core::{
    ATTRIBUTE_TYPE, BASE_SUBTYPE, Binding, MetaDataRegistry, MetaDataTypeProvider, NodeRole, NodeTemplate, Result,
    ValueKind,
};

use super::root::ROOT_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{ATTR_BOOLEAN, ATTR_DOUBLE, ATTR_INT, ATTR_LONG, ATTR_STRING, ATTR_STRING_ARRAY};

pub const ATTRIBUTE_PROVIDER: &str = "attributes";

const SUBTYPES: &[Subtype] = &[
    Subtype::valued(ATTR_STRING, "StringAttribute", ValueKind::String),
    Subtype::valued(ATTR_INT, "IntAttribute", ValueKind::Int),
    Subtype::valued(ATTR_LONG, "LongAttribute", ValueKind::Long),
    Subtype::valued(ATTR_DOUBLE, "DoubleAttribute", ValueKind::Double),
    Subtype::valued(ATTR_BOOLEAN, "BooleanAttribute", ValueKind::Boolean),
    Subtype::valued(ATTR_STRING_ARRAY, "StringArrayAttribute", ValueKind::StringArray),
];

/// Registers `attr.base` and the typed attribute subtypes. Attributes are
/// leaves and accept no children.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeTypesProvider;

impl MetaDataTypeProvider for AttributeTypesProvider {
    fn provider_id(&self) -> &str {
        ATTRIBUTE_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![ROOT_PROVIDER.to_string()]
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(
            Binding::of("MetaAttribute", NodeTemplate::new(NodeRole::Attribute).with_value_kind(ValueKind::String)),
            |b| {
                b.type_name(ATTRIBUTE_TYPE)
                    .sub_type(BASE_SUBTYPE)
                    .description("Named value attached to another node")
            },
        )?;
        register_subtypes(registry, ATTRIBUTE_TYPE, NodeRole::Attribute, SUBTYPES)
    }
}
