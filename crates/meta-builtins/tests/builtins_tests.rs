//! Built-in provider loading and the core constraint set

use std::sync::Arc;

use meta_builtins::{BUILTIN_COUNT, bootstrap, bootstrap_from_manifest, catalog, init_global};
use meta_core::{ConstraintKind, Error, MetaDataRegistry, RegistryConfig, Value};
use meta_graph::MetaGraph;
use meta_test_utils::TestManifest;
use pretty_assertions::assert_eq;
use rstest::rstest;

const ALL: &[&str] = &[
    "core",
    "attributes",
    "fields",
    "validators",
    "views",
    "identities",
    "relationships",
    "objects",
    "core-constraints",
];

fn loaded() -> Arc<MetaDataRegistry> {
    let registry = Arc::new(MetaDataRegistry::new());
    bootstrap(&registry).unwrap();
    registry
}

fn graph() -> MetaGraph {
    MetaGraph::new(loaded(), "metadata", "base", "app").unwrap()
}

#[test]
fn test_bootstrap_loads_every_provider_in_dependency_order() {
    let registry = MetaDataRegistry::new();
    let report = bootstrap(&registry).unwrap();

    assert_eq!(report.loaded.len(), BUILTIN_COUNT);
    assert_eq!(report.loaded.first().map(String::as_str), Some("core"));
    assert_eq!(report.loaded.last().map(String::as_str), Some("core-constraints"));
    let position = |id: &str| report.loaded.iter().position(|l| l == id).unwrap();
    assert!(position("attributes") < position("fields"));
    assert!(position("fields") < position("objects"));
    assert!(position("relationships") < position("objects"));
}

#[test]
fn test_second_bootstrap_is_noop() {
    let registry = MetaDataRegistry::new();
    let first = bootstrap(&registry).unwrap();
    let second = bootstrap(&registry).unwrap();

    assert!(second.is_noop());
    assert_eq!(second.already_loaded.len(), BUILTIN_COUNT);
    assert_eq!(second.type_count, first.type_count);
}

#[test]
fn test_catalog_lists_every_builtin() {
    let catalog = catalog();
    let mut ids = catalog.ids();
    ids.sort_unstable();
    let mut expected = ALL.to_vec();
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

#[test]
fn test_registered_families() {
    let registry = loaded();
    let stats = registry.stats();
    assert_eq!(stats.types_by_primary.get("field"), Some(&9));
    assert_eq!(stats.types_by_primary.get("attr"), Some(&7));
    assert_eq!(stats.types_by_primary.get("object"), Some(&5));
    assert_eq!(stats.placement_constraints, 4);
    assert_eq!(stats.validation_constraints, 5);
    assert_eq!(stats.relationship_constraints, 4);
    assert_eq!(stats.loaded_providers.len(), BUILTIN_COUNT);
}

#[rstest]
#[case::string_bounds("field", "string", "attr", "int", "maxLength", true)]
#[case::numeric_bounds("field", "int", "attr", "string", "minValue", true)]
#[case::no_length_on_int("field", "int", "attr", "int", "maxLength", false)]
#[case::inherited_required("field", "double", "attr", "boolean", "required", true)]
#[case::field_validator("field", "long", "validator", "length", "len", true)]
#[case::regex_mask("validator", "regex", "attr", "string", "mask", true)]
#[case::object_field("object", "pojo", "field", "string", "email", true)]
#[case::object_identity("object", "value", "identity", "primary", "id", true)]
#[case::attribute_leaf("attr", "string", "attr", "string", "nested", false)]
fn test_declared_placements(
    #[case] parent_type: &str,
    #[case] parent_sub: &str,
    #[case] child_type: &str,
    #[case] child_sub: &str,
    #[case] name: &str,
    #[case] accepted: bool,
) {
    let registry = loaded();
    assert_eq!(
        registry
            .accepts_child(parent_type, parent_sub, child_type, child_sub, name)
            .unwrap(),
        accepted
    );
}

#[test]
fn test_reference_fields_require_object_ref() {
    let registry = loaded();
    let missing = registry.missing_required_children("field", "object", &[]).unwrap();
    assert!(missing.iter().any(|r| r.name.to_string() == "objectRef"));
    assert!(registry.missing_required_children("field", "string", &[]).unwrap().is_empty());
}

#[test]
fn test_manifest_bootstrap() {
    let manifest = TestManifest::toml(ALL);
    let registry = MetaDataRegistry::new();
    let report = bootstrap_from_manifest(&registry, manifest.path(), &RegistryConfig::default()).unwrap();
    assert_eq!(report.loaded.len(), BUILTIN_COUNT);
    assert!(registry.has_type("relationship"));
}

#[test]
fn test_partial_yaml_manifest() {
    let manifest = TestManifest::yaml(&["core", "attributes", "fields"]);
    let registry = MetaDataRegistry::new();
    let report = bootstrap_from_manifest(&registry, manifest.path(), &RegistryConfig::default()).unwrap();

    assert_eq!(report.loaded, vec!["core", "attributes", "fields"]);
    assert!(registry.type_definition("field", "string").is_some());
    assert!(!registry.has_type("object"));
}

#[test]
fn test_manifest_missing_dependency() {
    let manifest = TestManifest::toml(&["core", "fields"]);
    let registry = MetaDataRegistry::new();
    let err = bootstrap_from_manifest(&registry, manifest.path(), &RegistryConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingProviderDependency { ref provider, ref dependency }
            if provider == "fields" && dependency == "attributes"
    ));
}

#[test]
fn test_manifest_unknown_provider() {
    let manifest = TestManifest::toml(&["core", "plugins"]);
    let registry = MetaDataRegistry::new();
    let err = bootstrap_from_manifest(&registry, manifest.path(), &RegistryConfig::default()).unwrap_err();
    assert!(matches!(err, Error::UnknownProvider { ref id } if id == "plugins"));
}

#[test]
fn test_disabled_dependency_is_named() {
    let manifest = TestManifest::toml(ALL);
    let config = RegistryConfig::from_toml("[providers]\ndisabled = [\"attributes\"]\n").unwrap();
    let registry = MetaDataRegistry::new();
    let err = bootstrap_from_manifest(&registry, manifest.path(), &config).unwrap_err();
    assert!(matches!(
        err,
        Error::DisabledProviderDependency { ref dependency, .. } if dependency == "attributes"
    ));
    assert!(registry.loaded_providers().is_empty());
}

#[test]
fn test_disabled_provider_is_skipped() {
    let manifest = TestManifest::toml(ALL);
    let config = RegistryConfig::from_toml("[providers]\ndisabled = [\"core-constraints\"]\n").unwrap();
    let registry = MetaDataRegistry::new();
    let report = bootstrap_from_manifest(&registry, manifest.path(), &config).unwrap();

    assert_eq!(report.loaded.len(), BUILTIN_COUNT - 1);
    assert_eq!(report.disabled, vec!["core-constraints"]);
    assert_eq!(registry.stats().constraint_count(), 0);
}

#[test]
fn test_init_global_is_idempotent() {
    let first = init_global().unwrap();
    let second = init_global().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.is_provider_loaded("core-constraints"));
    assert_eq!(first.loaded_providers().len(), BUILTIN_COUNT);
}

#[test]
fn test_duplicate_field_name_rejected() {
    let mut graph = graph();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    graph.attach(basket, "field", "string", "email").unwrap();

    let err = graph.attach(basket, "field", "int", "email").unwrap_err();
    let violation = err.as_violation().unwrap();
    assert_eq!(violation.constraint_id, "object.field.uniqueness");
    assert_eq!(violation.kind, ConstraintKind::Uniqueness);
    assert_eq!(graph.child_count(basket).unwrap(), 1);
}

#[rstest]
#[case("1Basket")]
#[case("my-basket")]
#[case("")]
fn test_object_names_must_be_identifiers(#[case] name: &str) {
    let mut graph = graph();
    let err = graph.attach(graph.root(), "object", "pojo", name).unwrap_err();
    let violation = err.as_violation().unwrap();
    assert_eq!(violation.constraint_id, "object.naming.pattern");
    assert_eq!(violation.kind, ConstraintKind::Regex);
}

#[test]
fn test_relationships_placed_by_constraint() {
    let mut graph = graph();
    let root = graph.root();
    let basket = graph.attach(root, "object", "pojo", "Basket").unwrap();
    let owner = graph.attach(basket, "relationship", "association", "owner").unwrap();
    graph.attribute(owner, "string", "targetObject", "Person").unwrap();
    assert!(graph.missing_required(owner).unwrap().is_empty());

    let email = graph.attach(basket, "field", "string", "email").unwrap();
    let err = graph.attach(email, "relationship", "composition", "items").unwrap_err();
    assert_eq!(err.as_violation().unwrap().kind, ConstraintKind::Placement);
}

#[test]
fn test_identity_requires_fields() {
    let mut graph = graph();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    let id = graph.attach(basket, "identity", "primary", "pk").unwrap();
    assert_eq!(graph.missing_required(id).unwrap().len(), 1);

    graph.attribute(id, "stringArray", "fields", "id, region").unwrap();
    assert!(graph.missing_required(id).unwrap().is_empty());
    assert_eq!(
        graph.attribute_value(id, "fields").unwrap(),
        Some(Value::StringArray(vec!["id".into(), "region".into()]))
    );
}

#[test]
fn test_instance_defaults_from_builtin_fields() {
    let mut graph = graph();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    let apples = graph.attach(basket, "field", "int", "numApples").unwrap();
    graph.attribute(apples, "string", "defaultValue", "5").unwrap();
    let fresh = graph.attach(basket, "field", "boolean", "fresh").unwrap();
    graph.attribute(fresh, "string", "defaultValue", "yes").unwrap();
    graph.freeze();

    let instance = graph.new_instance(basket).unwrap();
    assert_eq!(instance.get("numApples"), Some(&Value::Int(5)));
    assert_eq!(instance.get("fresh"), Some(&Value::Bool(true)));
}

#[test]
fn test_references_resolve_once_loaded() {
    let mut graph = graph();
    let root = graph.root();
    let basket = graph.attach(root, "object", "pojo", "Basket").unwrap();
    graph.attach(basket, "field", "string", "User").unwrap();
    let owner = graph.attach(basket, "field", "object", "owner").unwrap();
    graph.attribute(owner, "string", "objectRef", "User").unwrap();
    let orders = graph.attach(basket, "relationship", "association", "orders").unwrap();
    graph.attribute(orders, "string", "targetObject", "Order").unwrap();

    let violations = graph.validate_relationships();
    let found: Vec<_> = violations
        .iter()
        .map(|v| (v.constraint_id.as_str(), v.path.to_string()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("field.objectRef.resolves", "app/Basket/owner/objectRef".to_string()),
            ("relationship.target.resolves", "app/Basket/orders/targetObject".to_string()),
        ]
    );
    assert!(violations.iter().all(|v| v.kind == ConstraintKind::Relationship));
    assert_eq!(violations[0].value, Some(Value::from("User")));

    graph.attach(root, "object", "pojo", "User").unwrap();
    graph.attach(root, "object", "value", "Order").unwrap();
    assert!(graph.validate_relationships().is_empty());
}

#[test]
fn test_object_inheritance_references() {
    let mut graph = graph();
    let root = graph.root();
    graph.attach(root, "object", "pojo", "Named").unwrap();
    let basket = graph.attach(root, "object", "pojo", "Basket").unwrap();
    graph.attribute(basket, "string", "extends", "Container").unwrap();
    graph.attribute(basket, "stringArray", "implements", "Named, Priced").unwrap();

    let violations = graph.validate_relationships();
    let ids: Vec<_> = violations.iter().map(|v| v.constraint_id.as_str()).collect();
    assert_eq!(ids, vec!["object.extends.resolves", "object.implements.resolves"]);
    assert!(violations[1].message.contains("'Priced'"));
}
