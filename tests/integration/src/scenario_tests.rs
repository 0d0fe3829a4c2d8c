//! End-to-end scenarios across the registry, the built-in providers and the
//! object graph.

use std::sync::Arc;

use meta_builtins::bootstrap;
use meta_core::{
    Binding, ConstraintKind, DeclareChildren, Error, MetaDataRegistry, NodeRole, NodeTemplate, PlacementConstraint,
    ProviderLoader, RegistryConfig, StaticDiscovery, Target, ValidationConstraint, Value, ValueKind, ViolationMode,
};
use meta_graph::{GraphError, MetaGraph};
use meta_test_utils::{ProviderLog, RecordingProvider};
use pretty_assertions::assert_eq;

fn builtins() -> Arc<MetaDataRegistry> {
    let registry = Arc::new(MetaDataRegistry::new());
    bootstrap(&registry).unwrap();
    registry
}

#[test]
fn test_inherited_and_direct_attribute_placement() {
    let registry = MetaDataRegistry::new();
    let field = |name: &str| Binding::of(name, NodeTemplate::new(NodeRole::Field));
    registry
        .register_type(field("Field"), |b| {
            b.type_name("field").sub_type("base").optional_attribute("boolean", "required")
        })
        .unwrap();
    registry
        .register_type(field("StringField"), |b| {
            b.type_name("field")
                .sub_type("string")
                .inherits_from("field", "base")
                .optional_attribute("int", "maxLength")
        })
        .unwrap();

    assert!(registry.accepts_child("field", "string", "attr", "boolean", "required").unwrap());
    assert!(registry.accepts_child("field", "string", "attr", "int", "maxLength").unwrap());
    assert!(!registry.accepts_child("field", "base", "attr", "int", "maxLength").unwrap());

    // the built-in field family answers the same way
    let builtins = builtins();
    assert!(builtins.accepts_child("field", "string", "attr", "boolean", "required").unwrap());
    assert!(builtins.accepts_child("field", "string", "attr", "int", "maxLength").unwrap());
}

#[test]
fn test_placement_constraint_admits_field() {
    let registry = Arc::new(MetaDataRegistry::new());
    registry
        .register_type(Binding::of("Root", NodeTemplate::new(NodeRole::Root)), |b| {
            b.type_name("metadata").sub_type("base").optional_child_array("object", "*", "*")
        })
        .unwrap();
    registry
        .register_type(Binding::of("Pojo", NodeTemplate::new(NodeRole::Object)), |b| {
            b.type_name("object").sub_type("pojo")
        })
        .unwrap();
    registry
        .register_type(
            Binding::of("StringField", NodeTemplate::new(NodeRole::Field).with_value_kind(ValueKind::String)),
            |b| b.type_name("field").sub_type("string"),
        )
        .unwrap();

    let mut graph = MetaGraph::new(Arc::clone(&registry), "metadata", "base", "app").unwrap();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    assert!(graph.attach(basket, "field", "string", "email").unwrap_err().is_violation());

    registry
        .add_constraint(
            PlacementConstraint::new("object.fields", "objects contain fields")
                .parent("object", "*")
                .child("field", "*"),
        )
        .unwrap();
    let before = graph.stats().attached_count;
    let email = graph.attach(basket, "field", "string", "email").unwrap();

    assert_eq!(graph.stats().attached_count, before + 1);
    assert_eq!(graph.path(email).unwrap().to_string(), "app/Basket/email");
}

#[test]
fn test_regex_on_attribute_value() {
    let registry = builtins();
    registry
        .add_constraint(
            ValidationConstraint::regex(
                "pattern.identifier",
                Target::new("attr", "string", "pattern"),
                "^[a-zA-Z][a-zA-Z0-9_]*$",
            )
            .unwrap(),
        )
        .unwrap();
    let mut graph = MetaGraph::new(registry, "metadata", "base", "app").unwrap();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    let code = graph.attach(basket, "field", "string", "code").unwrap();
    let pattern = graph.attribute(code, "string", "pattern", "validName").unwrap();

    let err = graph.set_value(pattern, "123bad").unwrap_err();
    let violation = err.as_violation().unwrap();
    assert_eq!(violation.constraint_id, "pattern.identifier");
    assert_eq!(violation.kind, ConstraintKind::Regex);
    assert_eq!(violation.value, Some(Value::from("123bad")));
    assert_eq!(violation.path.to_string(), "app/Basket/code/pattern");

    graph.set_value(pattern, "otherName").unwrap();
    assert_eq!(graph.attribute_value(code, "pattern").unwrap(), Some(Value::from("otherName")));
}

#[test]
fn test_dependency_runs_first_whatever_discovery_order() {
    let log = ProviderLog::new();
    let first = RecordingProvider::new("p1", &log);
    let second = RecordingProvider::new("p2", &log).depends_on("p1");
    let registry = MetaDataRegistry::new();

    let report = ProviderLoader::new()
        .with_discovery(StaticDiscovery::default().with(second).with(first))
        .load(&registry)
        .unwrap();

    assert_eq!(log.entries(), vec!["p1", "p2"]);
    assert_eq!(report.loaded, vec!["p1", "p2"]);
    assert!(registry.accepts_child("p2", "base", "p1", "x", "y").unwrap());
}

#[test]
fn test_new_instance_defaults() {
    let mut graph = MetaGraph::new(builtins(), "metadata", "base", "app").unwrap();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    let id = graph.attach(basket, "field", "long", "id").unwrap();
    graph.attribute(id, "boolean", "required", true).unwrap();
    let apples = graph.attach(basket, "field", "int", "numApples").unwrap();
    graph.attribute(apples, "string", "defaultValue", "0").unwrap();
    let key = graph.attach(basket, "identity", "primary", "basketKey").unwrap();
    graph.attribute(key, "stringArray", "fields", "id").unwrap();
    graph.freeze();

    let mut instance = graph.new_instance(basket).unwrap();
    assert_eq!(instance.get("numApples"), Some(&Value::Int(0)));
    assert!(!instance.is_set("id"));
    assert_eq!(instance.object_name(), "Basket");

    graph.assign(basket, &mut instance, "id", "42").unwrap();
    assert_eq!(instance.get("id"), Some(&Value::Int(42)));
}

#[test]
fn test_duplicate_registration_strict_and_relaxed() {
    let registry = builtins();
    let binding = || Binding::of("CustomString", NodeTemplate::new(NodeRole::Field));

    let err = registry
        .register_type(binding(), |b| b.type_name("field").sub_type("string"))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateType { .. }));
    assert_eq!(registry.type_definition("field", "string").unwrap().binding().name(), "StringField");

    {
        let _relaxed = registry.relax_duplicate_detection();
        registry
            .register_type(binding(), |b| {
                b.type_name("field").sub_type("string").inherits_from("field", "base")
            })
            .unwrap();
    }
    assert_eq!(registry.type_definition("field", "string").unwrap().binding().name(), "CustomString");
}

#[test]
fn test_configured_collect_all_session() {
    let config = RegistryConfig::from_toml("[enforcement]\nmode = \"collect-all\"\n").unwrap();
    let mut graph = MetaGraph::new(builtins(), "metadata", "base", "app").unwrap();
    let root = graph.root();

    let mut session = graph.session(config.enforcement.mode);
    assert_eq!(session.mode(), ViolationMode::CollectAll);
    let basket = session.attach(root, "object", "pojo", "Basket").unwrap().unwrap();
    session.attach(basket, "field", "string", "email").unwrap();
    session.attach(basket, "field", "string", "email").unwrap();
    session.attach(basket, "field", "string", "2fast").unwrap();
    session.attach(root, "object", "pojo", "bad-name").unwrap();
    let violations = session.finish();

    let ids: Vec<_> = violations.iter().map(|v| v.constraint_id.as_str()).collect();
    assert_eq!(ids, vec!["object.field.uniqueness", "field.naming.pattern", "object.naming.pattern"]);
    assert_eq!(graph.child_count(basket).unwrap(), 1);
    assert_eq!(graph.child_count(root).unwrap(), 1);
}

#[test]
fn test_violation_propagates_outside_disabled_scope() {
    let mut graph = MetaGraph::new(builtins(), "metadata", "base", "app").unwrap();
    let root = graph.root();
    let legacy = graph
        .with_constraints_disabled(|g| g.attach(root, "object", "pojo", "legacy-name"))
        .unwrap();
    assert_eq!(graph.path(legacy).unwrap().to_string(), "app/legacy-name");

    let err = graph.attach(root, "object", "pojo", "other-name").unwrap_err();
    assert!(matches!(err, GraphError::Core(Error::Violation(_))));
}
