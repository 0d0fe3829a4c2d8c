use meta_core::{
    ATTRIBUTE_TYPE, BASE_SUBTYPE, Binding, DeclareChildren, MetaDataRegistry, MetaDataTypeProvider, NodeRole,
    NodeTemplate, Result,
};

use super::attributes::ATTRIBUTE_PROVIDER;
use super::{Subtype, register_subtypes};
use crate::names::{
    ATTR_BOOLEAN, ATTR_STRING, CARDINALITY, DESCRIPTION, IS_ABSTRACT, REFERENCED_BY, TARGET_OBJECT, TYPE_RELATIONSHIP,
};

pub const RELATIONSHIP_PROVIDER: &str = "relationships";

const SUBTYPES: &[Subtype] = &[
    Subtype::new("composition", "CompositionRelationship"),
    Subtype::new("aggregation", "AggregationRelationship"),
    Subtype::new("association", "AssociationRelationship"),
];

/// Registers `relationship.base` and its lifecycle subtypes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipTypesProvider;

impl MetaDataTypeProvider for RelationshipTypesProvider {
    fn provider_id(&self) -> &str {
        RELATIONSHIP_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![ATTRIBUTE_PROVIDER.to_string()]
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.register_type(
            Binding::of("MetaRelationship", NodeTemplate::new(NodeRole::Relationship)),
            |b| {
                b.type_name(TYPE_RELATIONSHIP)
                    .sub_type(BASE_SUBTYPE)
                    .description("Link from one object to another")
                    .optional_attribute(ATTR_BOOLEAN, IS_ABSTRACT)
                    .required_attribute(ATTR_STRING, TARGET_OBJECT)
                    .optional_attribute(ATTR_STRING, CARDINALITY)
                    .optional_attribute(ATTR_STRING, REFERENCED_BY)
                    .optional_attribute(ATTR_STRING, DESCRIPTION)
                    .optional_child_array(ATTRIBUTE_TYPE, "*", "*")
            },
        )?;
        register_subtypes(registry, TYPE_RELATIONSHIP, NodeRole::Relationship, SUBTYPES)
    }
}
