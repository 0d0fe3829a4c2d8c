//! Integration tests for type registration and inheritance resolution

use meta_core::{
    Binding, Cardinality, ChildRequirement, DeclareChildren, Error, MetaDataRegistry, NodeKey,
    NodeRole, NodeTemplate, RegistryConfig, TypeId, ValueKind,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn field_binding(name: &str) -> Binding {
    Binding::of(name, NodeTemplate::new(NodeRole::Field).with_value_kind(ValueKind::String))
}

fn field_registry() -> MetaDataRegistry {
    let registry = MetaDataRegistry::new();
    registry
        .register_type(field_binding("BaseField"), |b| {
            b.type_name("field")
                .sub_type("base")
                .optional_attribute("boolean", "required")
        })
        .unwrap();
    registry
        .register_type(field_binding("StringField"), |b| {
            b.type_name("field")
                .sub_type("string")
                .inherits_from("field", "base")
                .optional_attribute("int", "maxLength")
        })
        .unwrap();
    registry
}

/// A(root) -> B -> C, with `shared` declared at every level.
fn chain_registry() -> MetaDataRegistry {
    let registry = MetaDataRegistry::new();
    let binding = Binding::of("Node", NodeTemplate::new(NodeRole::Other));
    registry
        .register_type(binding.clone(), |b| {
            b.type_name("node")
                .sub_type("a")
                .optional_child("x", "a", "*")
                .child(ChildRequirement::optional("attr", "string", "shared"))
        })
        .unwrap();
    registry
        .register_type(binding.clone(), |b| {
            b.type_name("node")
                .sub_type("b")
                .inherits_from("node", "a")
                .optional_child("x", "b", "*")
                .child(ChildRequirement::required("attr", "string", "shared"))
        })
        .unwrap();
    registry
        .register_type(binding, |b| {
            b.type_name("node")
                .sub_type("c")
                .inherits_from("node", "b")
                .optional_child("x", "c", "*")
                .child(
                    ChildRequirement::optional("attr", "string", "shared")
                        .with_cardinality(Cardinality::Array),
                )
        })
        .unwrap();
    registry
}

#[test]
fn test_inherited_and_direct_attributes() {
    let registry = field_registry();
    assert!(registry.accepts_child("field", "string", "attr", "boolean", "required").unwrap());
    assert!(registry.accepts_child("field", "string", "attr", "int", "maxLength").unwrap());
    assert!(!registry.accepts_child("field", "base", "attr", "int", "maxLength").unwrap());
    assert!(!registry.accepts_child("field", "string", "attr", "int", "other").unwrap());
}

#[rstest]
#[case("x", "a")]
#[case("x", "b")]
#[case("x", "c")]
fn test_three_level_chain_accepts_every_level(#[case] child_type: &str, #[case] child_sub: &str) {
    let registry = chain_registry();
    assert!(registry.accepts_child("node", "c", child_type, child_sub, "anything").unwrap());
}

#[test]
fn test_closest_declaration_wins() {
    let registry = chain_registry();

    let at_c = registry
        .child_requirement("node", "c", "attr", "string", "shared")
        .unwrap()
        .unwrap();
    assert_eq!(at_c.cardinality, Cardinality::Array);
    assert!(!at_c.required);

    let at_b = registry
        .child_requirement("node", "b", "attr", "string", "shared")
        .unwrap()
        .unwrap();
    assert!(at_b.required);
    assert_eq!(at_b.cardinality, Cardinality::Single);

    let effective = registry.effective_requirements("node", "c").unwrap().unwrap();
    let shared: Vec<_> = effective
        .requirements()
        .iter()
        .filter(|r| r.name.as_exact() == Some("shared"))
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(effective.depth(), 2);
    assert_eq!(
        effective.chain(),
        &[TypeId::new("node", "c"), TypeId::new("node", "b"), TypeId::new("node", "a")]
    );
}

#[test]
fn test_inherited_requirements_exclude_direct() {
    let registry = field_registry();
    let inherited = registry.inherited_requirements("field", "string").unwrap();
    assert_eq!(inherited.len(), 1);
    assert_eq!(inherited[0].name.as_exact(), Some("required"));
    assert!(registry.inherited_requirements("field", "base").unwrap().is_empty());
    assert!(registry.inherited_requirements("nope", "nope").unwrap().is_empty());
}

#[test]
fn test_unresolved_parent_is_an_error() {
    let registry = MetaDataRegistry::new();
    registry
        .register_type(field_binding("Orphan"), |b| {
            b.type_name("field").sub_type("orphan").inherits_from("field", "missing")
        })
        .unwrap();

    let err = registry
        .accepts_child("field", "orphan", "attr", "boolean", "required")
        .unwrap_err();
    match err {
        Error::UnresolvedParent { type_id, parent } => {
            assert_eq!(type_id, TypeId::new("field", "orphan"));
            assert_eq!(parent, TypeId::new("field", "missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(registry.resolve_all().is_err());
}

#[test]
fn test_cycle_detected_at_resolution() {
    let registry = MetaDataRegistry::new();
    let binding = Binding::of("Loop", NodeTemplate::new(NodeRole::Other));
    registry
        .register_type(binding.clone(), |b| b.type_name("t").sub_type("a").inherits_from("t", "b"))
        .unwrap();
    registry
        .register_type(binding.clone(), |b| b.type_name("t").sub_type("b").inherits_from("t", "c"))
        .unwrap();
    registry
        .register_type(binding, |b| b.type_name("t").sub_type("c").inherits_from("t", "a"))
        .unwrap();

    match registry.accepts_child("t", "a", "x", "y", "z") {
        Err(Error::InheritanceCycle { chain }) => assert_eq!(chain, "t.a -> t.b -> t.c -> t.a"),
        other => panic!("expected cycle, got {other:?}"),
    }
    assert!(matches!(registry.resolve_all(), Err(Error::InheritanceCycle { .. })));
}

#[test]
fn test_self_parent_rejected_at_registration() {
    let registry = MetaDataRegistry::new();
    let err = registry
        .register_type(field_binding("Self"), |b| {
            b.type_name("field").sub_type("loop").inherits_from("field", "loop")
        })
        .unwrap_err();
    assert!(matches!(err, Error::InheritanceCycle { .. }));
    assert!(registry.type_definition("field", "loop").is_none());
}

#[test]
fn test_duplicate_rejected_in_strict_mode() {
    let registry = field_registry();
    let err = registry
        .register_type(field_binding("OtherString"), |b| b.type_name("field").sub_type("string"))
        .unwrap_err();
    match err {
        Error::DuplicateType { type_id, existing, new } => {
            assert_eq!(type_id.to_string(), "field.string");
            assert_eq!(existing, "StringField");
            assert_eq!(new, "OtherString");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_overrides_when_relaxed() {
    let registry = field_registry();
    {
        let _relaxed = registry.relax_duplicate_detection();
        registry
            .register_type(field_binding("OtherString"), |b| b.type_name("field").sub_type("string"))
            .unwrap();
    }
    let def = registry.type_definition("field", "string").unwrap();
    assert_eq!(def.binding().name(), "OtherString");
    // the override dropped the parent, so inherited attributes are gone
    assert!(!registry.accepts_child("field", "string", "attr", "boolean", "required").unwrap());

    // strict mode is back once the guard is dropped
    assert!(registry
        .register_type(field_binding("Third"), |b| b.type_name("field").sub_type("string"))
        .is_err());
}

#[test]
fn test_non_strict_config() {
    let config = RegistryConfig::from_toml("[registry]\nstrict_duplicates = false\n").unwrap();
    let registry = MetaDataRegistry::with_config(&config);
    let binding = field_binding("F");
    registry.register_type(binding.clone(), |b| b.type_name("f").sub_type("x")).unwrap();
    registry.register_type(binding, |b| b.type_name("f").sub_type("x")).unwrap();
    assert_eq!(registry.type_ids().len(), 1);
}

#[test]
fn test_find_type_extension() {
    let registry = field_registry();
    registry.resolve_all().unwrap();
    registry
        .find_type("field", "base")
        .unwrap()
        .optional_attribute("string", "dbColumn")
        .apply()
        .unwrap();

    // subtypes see attributes added to an ancestor after their own resolution
    assert!(registry.accepts_child("field", "string", "attr", "string", "dbColumn").unwrap());

    match registry.find_type("field", "blob") {
        Err(Error::UnknownType { available, .. }) => {
            assert_eq!(available, "field.base, field.string");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected unknown type"),
    }
}

#[test]
fn test_extend_by_binding() {
    let registry = field_registry();
    registry
        .extend_binding("StringField", |ext| ext.required_attribute("string", "pattern"))
        .unwrap();
    let req = registry
        .child_requirement("field", "string", "attr", "string", "pattern")
        .unwrap()
        .unwrap();
    assert!(req.required);

    assert!(matches!(
        registry.extend_binding("NoSuchBinding", |ext| ext),
        Err(Error::UnknownBinding { .. })
    ));
}

#[test]
fn test_lookup_helpers() {
    let registry = field_registry();
    assert!(registry.has_type("field"));
    assert!(!registry.has_type("object"));
    assert!(registry.contains(&TypeId::new("field", "base")));
    assert_eq!(
        registry.type_ids(),
        vec![TypeId::new("field", "base"), TypeId::new("field", "string")]
    );
    assert_eq!(registry.definitions().len(), 2);
    assert_eq!(
        registry.find_by_binding("StringField").map(|d| d.type_id().clone()),
        Some(TypeId::new("field", "string"))
    );
    assert_eq!(registry.subtypes_of("field"), vec!["base", "string"]);
}

#[test]
fn test_supported_children_description() {
    let registry = field_registry();
    assert_eq!(
        registry.supported_children_description("field", "string"),
        "optional attribute 'maxLength' of type int; optional attribute 'required' of type boolean"
    );
    assert!(registry
        .supported_children_description("field", "nope")
        .starts_with("unknown type"));
}

#[test]
fn test_missing_required_children() {
    let registry = MetaDataRegistry::new();
    registry
        .register_type(Binding::of("Obj", NodeTemplate::new(NodeRole::Object)), |b| {
            b.type_name("object")
                .sub_type("pojo")
                .required_attribute("string", "table")
                .required_child("identity", "primary", "*")
                .optional_child_array("field", "*", "*")
        })
        .unwrap();

    let present = [NodeKey::new("identity", "primary", "id"), NodeKey::new("field", "string", "name")];
    let missing = registry.missing_required_children("object", "pojo", &present).unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].name.as_exact(), Some("table"));

    assert!(registry.missing_required_children("object", "unknown", &[]).unwrap().is_empty());
}

#[test]
fn test_create_template() {
    let registry = field_registry();
    let template = registry.create_template("field", "string", "email").unwrap();
    assert_eq!(template.role, NodeRole::Field);
    assert_eq!(template.value_kind, Some(ValueKind::String));
    assert!(matches!(
        registry.create_template("field", "blob", "x"),
        Err(Error::UnknownType { .. })
    ));
}

#[test]
fn test_stats() {
    let registry = field_registry();
    registry.resolve_all().unwrap();
    let stats = registry.stats();
    assert_eq!(stats.type_count, 2);
    assert_eq!(stats.types_by_primary.get("field"), Some(&2));
    assert_eq!(stats.cached_resolutions, 2);
    assert_eq!(stats.constraint_count(), 0);
    assert!(stats.to_string().starts_with("2 types"));
}

#[test]
fn test_concurrent_registration_is_register_if_absent() {
    use std::sync::Arc;
    use std::thread;

    let registry = Arc::new(MetaDataRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .register_type(field_binding(&format!("B{i}")), |b| b.type_name("field").sub_type("race"))
                    .is_ok()
            })
        })
        .collect();
    let winners = handles.into_iter().filter_map(|h| h.join().ok()).filter(|ok| *ok).count();
    assert_eq!(winners, 1);
}

#[test]
fn test_resolution_never_outlives_a_concurrent_extension() {
    use std::sync::Arc;
    use std::thread;

    let registry = Arc::new(field_registry());
    let names: Vec<String> = (0..24).map(|i| format!("extra{i}")).collect();
    thread::scope(|scope| {
        for _ in 0..3 {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                for _ in 0..200 {
                    registry.effective_requirements("field", "string").unwrap();
                }
            });
        }
        for name in &names {
            registry
                .find_type("field", "string")
                .unwrap()
                .optional_attribute("string", name.as_str())
                .apply()
                .unwrap();
        }
    });

    for name in &names {
        assert!(registry.accepts_child("field", "string", "attr", "string", name).unwrap());
    }
}
