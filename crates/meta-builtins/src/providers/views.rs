use meta_core::{
    BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole, NodeTemplate, Result,
};

use super::attributes::ATTRIBUTE_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{ATTR_STRING, LABEL, TYPE_VIEW};

pub const VIEW_PROVIDER: &str = "views";

const SUBTYPES: &[Subtype] = &[
    Subtype::new("text", "TextView"),
    Subtype::new("textarea", "TextAreaView"),
    Subtype::new("date", "DateView"),
    Subtype::new("monetary", "MonetaryView"),
    Subtype::new("hotlink", "HotLinkView"),
];

/// Registers `view.base` and the presentation hints attached to fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewTypesProvider;

impl MetaDataTypeProvider for ViewTypesProvider {
    fn provider_id(&self) -> &str {
        VIEW_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![ATTRIBUTE_PROVIDER.to_string()]
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(Binding::of("MetaView", NodeTemplate::new(NodeRole::View)), |b| {
            b.type_name(TYPE_VIEW)
                .sub_type(BASE_SUBTYPE)
                .description("Presentation hint for a field")
                .optional_attribute(ATTR_STRING, LABEL)
        })?;
        register_subtypes(registry, TYPE_VIEW, NodeRole::View, SUBTYPES)
    }
}
