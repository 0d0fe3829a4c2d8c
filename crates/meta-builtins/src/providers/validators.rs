use meta_core::{
    BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole, NodeTemplate, Result,
};

use super::attributes::ATTRIBUTE_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{ATTR_INT, ATTR_STRING, MASK, MAX, MESSAGE, MIN, TYPE_VALIDATOR};

pub const VALIDATOR_PROVIDER: &str = "validators";

const SUBTYPES: &[Subtype] = &[
    Subtype::new("required", "RequiredValidator"),
    Subtype::new("length", "LengthValidator"),
    Subtype::new("regex", "RegexValidator"),
    Subtype::new("numeric", "NumericValidator"),
    Subtype::new("array", "ArrayValidator"),
];

/// Registers `validator.base` and the declarative validator subtypes
/// attached to fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorTypesProvider;

impl MetaDataTypeProvider for ValidatorTypesProvider {
    fn provider_id(&self) -> &str {
        VALIDATOR_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![ATTRIBUTE_PROVIDER.to_string()]
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("MetaValidator", NodeTemplate::new(NodeRole::Validator)), |b| {
            b.type_name(TYPE_VALIDATOR)
                .sub_type(BASE_SUBTYPE)
                .description("Declarative value check attached to a field")
                .optional_attribute(ATTR_STRING, MESSAGE)
        })?;
        register_subtypes(registry, TYPE_VALIDATOR, NodeRole::Validator, SUBTYPES)?;

        registry
            .find_type(TYPE_VALIDATOR, "length")?
            .optional_attribute(ATTR_INT, MIN)
            .optional_attribute(ATTR_INT, MAX)
            .apply()?;
        registry
            .find_type(TYPE_VALIDATOR, "numeric")?
            .optional_attribute(ATTR_STRING, MIN)
            .optional_attribute(ATTR_STRING, MAX)
            .apply()?;
        registry
            .find_type(TYPE_VALIDATOR, "regex")?
            .required_attribute(ATTR_STRING, MASK)
            .apply()
    }
}
