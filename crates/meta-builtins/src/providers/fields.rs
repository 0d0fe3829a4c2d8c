use meta_core::{
    BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole,
    NodeTemplate, Result, ValueKind,
};
use tracing::debug;

use super::attributes::ATTRIBUTE_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{
    ATTR_BOOLEAN, ATTR_INT, ATTR_STRING, ATTR_STRING_ARRAY, DEFAULT_VALUE, DEFAULT_VIEW, DESCRIPTION, IS_ABSTRACT,
    MAX_LENGTH, MAX_VALUE, MIN_LENGTH, MIN_VALUE, OBJECT_REF, PATTERN, REQUIRED, TYPE_FIELD, TYPE_VALIDATOR,
    TYPE_VIEW, VALIDATION,
};

pub const FIELD_PROVIDER: &str = "fields";

const SUBTYPES: &[Subtype] = &[
    Subtype::valued("string", "StringField", ValueKind::String),
    Subtype::valued("int", "IntegerField", ValueKind::Int),
    Subtype::valued("long", "LongField", ValueKind::Long),
    Subtype::valued("double", "DoubleField", ValueKind::Double),
    Subtype::valued("boolean", "BooleanField", ValueKind::Boolean),
    Subtype::valued("stringArray", "StringArrayField", ValueKind::StringArray),
    Subtype::new("object", "ObjectField"),
    Subtype::new("objectArray", "ObjectArrayField"),
];

/// Registers `field.base` and the primitive and object field subtypes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTypesProvider;

impl MetaDataTypeProvider for FieldTypesProvider {
    fn provider_id(&self) -> &str {
        FIELD_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![ATTRIBUTE_PROVIDER.to_string()]
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("MetaField", NodeTemplate::new(NodeRole::Field)), |b| {
            b.type_name(TYPE_FIELD)
                .sub_type(BASE_SUBTYPE)
                .description("Typed member of an object")
                .optional_attribute(ATTR_BOOLEAN, REQUIRED)
                .optional_attribute(ATTR_BOOLEAN, IS_ABSTRACT)
                .optional_attribute(ATTR_STRING, DESCRIPTION)
                .optional_attribute(ATTR_STRING, DEFAULT_VALUE)
                .optional_attribute(ATTR_STRING, DEFAULT_VIEW)
                .optional_attribute(ATTR_STRING_ARRAY, VALIDATION)
                .optional_child_array(TYPE_VALIDATOR, "*", "*")
                .optional_child_array(TYPE_VIEW, "*", "*")
        })?;
        register_subtypes(registry, TYPE_FIELD, NodeRole::Field, SUBTYPES)?;

        // Subtype-specific attributes
        registry
            .find_type(TYPE_FIELD, "string")?
            .optional_attribute(ATTR_STRING, PATTERN)
            .optional_attribute(ATTR_INT, MIN_LENGTH)
            .optional_attribute(ATTR_INT, MAX_LENGTH)
            .apply()?;
        // Bounds are text, coerced by the field's own kind when used.
        for numeric in ["int", "long", "double"] {
            registry
                .find_type(TYPE_FIELD, numeric)?
                .optional_attribute(ATTR_STRING, MIN_VALUE)
                .optional_attribute(ATTR_STRING, MAX_VALUE)
                .apply()?;
        }
        for reference in ["object", "objectArray"] {
            registry
                .find_type(TYPE_FIELD, reference)?
                .required_attribute(ATTR_STRING, OBJECT_REF)
                .apply()?;
        }
        debug!(count = SUBTYPES.len(), "Registered field types");
        Ok(())
    }
}
