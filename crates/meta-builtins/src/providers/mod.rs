//! Built-in type providers - single list of everything that ships
//!
//! Each provider registers one family of types (a `base` root plus its
//! concrete subtypes). The list below is the only place providers are
//! enumerated; static discovery, the manifest catalog and the count all
//! derive from it.

mod attributes;
mod constraints;
mod fields;
mod identities;
mod objects;
mod relationships;
mod root;
mod validators;
mod views;

use std::sync::Arc;

pub use attributes::AttributeTypesProvider;
pub use constraints::CoreConstraintsProvider;
pub use fields::FieldTypesProvider;
pub use identities::IdentityTypesProvider;
pub use objects::ObjectTypesProvider;
pub use relationships::RelationshipTypesProvider;
pub use root::RootTypeProvider;
pub use validators::ValidatorTypesProvider;
pub use views::ViewTypesProvider;

use meta_core::{
    BASE_SUBTYPE, Binding, MetaDataRegistry, MetaDataTypeProvider, NodeRole, NodeTemplate, ProviderCatalog, Result,
    ValueKind,
};

/// Number of built-in providers.
pub const BUILTIN_COUNT: usize = 9;

/// Returns every built-in provider, in no particular order.
pub fn builtin_providers() -> Vec<Arc<dyn MetaDataTypeProvider>> {
    vec![
        Arc::new(RootTypeProvider),
        Arc::new(AttributeTypesProvider),
        Arc::new(FieldTypesProvider),
        Arc::new(ValidatorTypesProvider),
        Arc::new(ViewTypesProvider),
        Arc::new(IdentityTypesProvider),
        Arc::new(RelationshipTypesProvider),
        Arc::new(ObjectTypesProvider),
        Arc::new(CoreConstraintsProvider),
    ]
}

/// Catalog of built-in constructors keyed by provider id, for manifest
/// discovery.
pub fn catalog() -> ProviderCatalog {
    let mut catalog = ProviderCatalog::new();
    for provider in builtin_providers() {
        let id = provider.provider_id().to_string();
        catalog.register(id, move || Arc::clone(&provider));
    }
    catalog
}

/// One concrete subtype of a family.
pub(crate) struct Subtype {
    pub sub_type: &'static str,
    pub binding: &'static str,
    pub value_kind: Option<ValueKind>,
}

impl Subtype {
    pub(crate) const fn new(sub_type: &'static str, binding: &'static str) -> Self {
        Self {
            sub_type,
            binding,
            value_kind: None,
        }
    }

    pub(crate) const fn valued(sub_type: &'static str, binding: &'static str, kind: ValueKind) -> Self {
        Self {
            sub_type,
            binding,
            value_kind: Some(kind),
        }
    }
}

/// Register each subtype as `type_name.<sub_type>` inheriting from
/// `type_name.base`.
pub(crate) fn register_subtypes(
    registry: &MetaDataRegistry,
    type_name: &str,
    role: NodeRole,
    subtypes: &[Subtype],
) -> Result<()> {
    for subtype in subtypes {
        let mut template = NodeTemplate::new(role);
        if let Some(kind) = subtype.value_kind {
            template = template.with_value_kind(kind);
        }
        registry.register_type(Binding::of(subtype.binding, template), |b| {
            b.type_name(type_name)
                .sub_type(subtype.sub_type)
                .inherits_from(type_name, BASE_SUBTYPE)
        })?;
    }
    Ok(())
}
