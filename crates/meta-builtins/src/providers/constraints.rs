use meta_core::{
    ATTRIBUTE_TYPE, MetaDataRegistry, MetaDataTypeProvider, PlacementConstraint, RelationshipConstraint, Result,
    Target, ValidationConstraint,
};
use tracing::debug;

use super::objects::OBJECT_PROVIDER;
use crate::names::{
    ATTR_STRING, ATTR_STRING_ARRAY, EXTENDS, IMPLEMENTS, OBJECT_REF, TARGET_OBJECT, TYPE_FIELD, TYPE_IDENTITY,
    TYPE_METADATA, TYPE_OBJECT, TYPE_RELATIONSHIP, TYPE_VALIDATOR, TYPE_VIEW,
};

pub const CONSTRAINTS_PROVIDER: &str = "core-constraints";

/// Names of objects, fields and identities.
pub const IDENTIFIER_PATTERN: &str = "[a-zA-Z][a-zA-Z0-9_]*";

/// Registers the cross-cutting placement, validation and relationship rules
/// for the built-in types.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreConstraintsProvider;

impl MetaDataTypeProvider for CoreConstraintsProvider {
    fn provider_id(&self) -> &str {
        CONSTRAINTS_PROVIDER
    }

    fn dependencies(&self) -> Vec<String> {
        vec![OBJECT_PROVIDER.to_string()]
    }

    fn priority(&self) -> i32 {
        1000
    }

    fn register_types(&self, registry: &MetaDataRegistry) -> Result<()> {
        registry.add_constraint(
            PlacementConstraint::new("metadata.base.objects", "metadata roots can contain objects")
                .parent(TYPE_METADATA, "*")
                .child(TYPE_OBJECT, "*"),
        )?;
        registry.add_constraint(
            PlacementConstraint::new("object.relationships.placement", "objects can contain relationships")
                .parent(TYPE_OBJECT, "*")
                .child(TYPE_RELATIONSHIP, "*"),
        )?;
        registry.add_constraint(
            PlacementConstraint::new("field.validators.placement", "fields can contain validators")
                .parent(TYPE_FIELD, "*")
                .child(TYPE_VALIDATOR, "*"),
        )?;
        registry.add_constraint(
            PlacementConstraint::new("field.views.placement", "fields can contain views")
                .parent(TYPE_FIELD, "*")
                .child(TYPE_VIEW, "*"),
        )?;

        registry.add_constraint(
            ValidationConstraint::unique("object.field.uniqueness", Target::of_type(TYPE_FIELD, "*"))
                .on_name()
                .with_description("field names must be unique within an object"),
        )?;
        registry.add_constraint(
            ValidationConstraint::unique("object.identity.uniqueness", Target::of_type(TYPE_IDENTITY, "*"))
                .on_name()
                .with_description("identity names must be unique within an object"),
        )?;
        for (id, type_name) in [
            ("object.naming.pattern", TYPE_OBJECT),
            ("field.naming.pattern", TYPE_FIELD),
            ("identity.naming.pattern", TYPE_IDENTITY),
        ] {
            registry.add_constraint(
                ValidationConstraint::regex(id, Target::of_type(type_name, "*"), IDENTIFIER_PATTERN)?
                    .on_name()
                    .with_description(format!("{type_name} names must be identifiers")),
            )?;
        }

        // Attributes that name another object must resolve to one
        for (id, sub_type, attribute) in [
            ("field.objectRef.resolves", ATTR_STRING, OBJECT_REF),
            ("object.extends.resolves", ATTR_STRING, EXTENDS),
            ("object.implements.resolves", ATTR_STRING_ARRAY, IMPLEMENTS),
            ("relationship.target.resolves", ATTR_STRING, TARGET_OBJECT),
        ] {
            registry.add_constraint(
                RelationshipConstraint::new(
                    id,
                    Target::new(ATTRIBUTE_TYPE, sub_type, attribute),
                    Target::of_type(TYPE_OBJECT, "*"),
                )
                .with_description(format!("'{attribute}' must name an object in the graph")),
            )?;
        }
        debug!("Registered core constraints");
        Ok(())
    }
}
