//! Registry, placement and graph invariants checked over generated inputs.

use std::sync::Arc;

use meta_builtins::bootstrap;
use meta_core::{
    Binding, Cardinality, Error, MetaDataRegistry, NodeRole, NodeTemplate, PlacementConstraint, ProviderLoader,
    StaticDiscovery, Target, ValidationConstraint,
};
use meta_graph::MetaGraph;
use meta_test_utils::{ProviderLog, RecordingProvider, chain_registry, object_registry};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

/// Provider `i` depends on a subset of providers `0..i`; the second element
/// is a shuffled discovery order.
fn provider_dag() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..7).prop_flat_map(|n| {
        let deps: Vec<_> = (0..n)
            .map(|i| {
                prop::collection::vec(any::<bool>(), i).prop_map(|mask| {
                    mask.iter()
                        .enumerate()
                        .filter(|(_, d)| **d)
                        .map(|(j, _)| j)
                        .collect::<Vec<usize>>()
                })
            })
            .collect();
        (deps, Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    })
}

fn provider_id(i: usize) -> String {
    format!("p{i}")
}

proptest! {
    #[test]
    fn test_bootstrap_twice_equals_once((deps, order) in provider_dag()) {
        let log = ProviderLog::new();
        let registry = MetaDataRegistry::new();
        let mut counters = Vec::new();
        let mut discovery = StaticDiscovery::default();
        for &i in &order {
            let mut provider = RecordingProvider::new(provider_id(i), &log);
            for &d in &deps[i] {
                provider = provider.depends_on(provider_id(d));
            }
            counters.push(provider.call_counter());
            discovery = discovery.with(provider);
        }
        let loader = ProviderLoader::new().with_discovery(discovery);

        loader.load(&registry).unwrap();
        let after_first = (registry.type_ids(), registry.stats());
        let second = loader.load(&registry).unwrap();

        prop_assert!(second.is_noop());
        prop_assert_eq!((registry.type_ids(), registry.stats()), after_first);
        for counter in &counters {
            prop_assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
        }
        let entries = log.entries();
        for (i, needs) in deps.iter().enumerate() {
            let at = |id: &str| entries.iter().position(|e| e == id).unwrap();
            for &d in needs {
                prop_assert!(at(&provider_id(d)) < at(&provider_id(i)));
            }
        }
    }

    #[test]
    fn test_inheritance_cycle_is_reported(len in 1usize..8) {
        let registry = MetaDataRegistry::new();
        let binding = Binding::of("Looped", NodeTemplate::new(NodeRole::Other));
        for i in 0..len {
            let parent = format!("s{}", (i + 1) % len);
            let registered = registry.register_type(binding.clone(), |b| {
                b.type_name("t").sub_type(format!("s{i}")).inherits_from("t", parent.as_str())
            });
            if len == 1 {
                prop_assert!(matches!(registered, Err(Error::InheritanceCycle { .. })), "expected InheritanceCycle error");
                return Ok(());
            }
            registered.unwrap();
        }

        prop_assert!(matches!(registry.resolve_all(), Err(Error::InheritanceCycle { .. })), "expected InheritanceCycle error");
        for i in 0..len {
            let sub = format!("s{i}");
            let accepted = registry.accepts_child("t", &sub, "any", "any", "any");
            prop_assert!(matches!(accepted, Err(Error::InheritanceCycle { .. })), "expected InheritanceCycle error");
        }
    }

    #[test]
    fn test_value_must_satisfy_every_constraint(value in "[a-zA-Z]{0,5}") {
        let registry = object_registry();
        let target = || Target::new("attr", "string", "description");
        registry
            .add_constraint(ValidationConstraint::required("description.required", target()))
            .unwrap();
        registry
            .add_constraint(ValidationConstraint::regex("description.lower", target(), "[a-z]+").unwrap())
            .unwrap();
        registry
            .add_constraint(ValidationConstraint::length("description.short", target(), None, Some(3)).unwrap())
            .unwrap();
        let mut graph = MetaGraph::new(registry, "metadata", "base", "app").unwrap();
        let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();

        let expected = !value.is_empty() && value.len() <= 3 && value.chars().all(|c| c.is_ascii_lowercase());
        prop_assert_eq!(graph.attribute(basket, "string", "description", value.as_str()).is_ok(), expected);
    }

    #[test]
    fn test_read_only_queries_are_stable(rounds in 1usize..20) {
        let registry = Arc::new(MetaDataRegistry::new());
        bootstrap(&registry).unwrap();
        let mut graph = MetaGraph::new(Arc::clone(&registry), "metadata", "base", "app").unwrap();
        let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
        graph.attach(basket, "field", "string", "name").unwrap();
        let weight = graph.attach(basket, "field", "double", "weight").unwrap();
        graph.attribute(weight, "string", "defaultValue", "1.5").unwrap();
        graph.freeze();
        let passes = graph.stats().enforcement_passes;

        let snapshot = |g: &MetaGraph| {
            (
                g.meta_field(basket, "weight").unwrap(),
                g.object_fields(basket).unwrap(),
                g.attribute_value(weight, "defaultValue").unwrap(),
                registry.accepts_child("object", "pojo", "field", "string", "email").unwrap(),
            )
        };
        let first = snapshot(&graph);
        for _ in 0..rounds {
            prop_assert_eq!(snapshot(&graph), first.clone());
        }
        prop_assert_eq!(graph.stats().enforcement_passes, passes);
    }
}

#[test]
fn test_closest_declaration_wins_on_three_level_chain() {
    let registry = chain_registry();

    for (child_type, child_sub, name) in [
        ("attr", "string", "label"),
        ("attr", "boolean", "hidden"),
        ("attr", "string", "code"),
        ("note", "any", "anything"),
    ] {
        assert!(registry.accepts_child("chain", "c", child_type, child_sub, name).unwrap());
    }

    let rank = registry
        .child_requirement("chain", "c", "attr", "int", "rank")
        .unwrap()
        .unwrap();
    assert!(!rank.required);
    let hidden = registry
        .child_requirement("chain", "c", "attr", "boolean", "hidden")
        .unwrap()
        .unwrap();
    assert!(hidden.required);
    assert_eq!(hidden.cardinality, Cardinality::Single);
    assert!(
        registry
            .child_requirement("chain", "a", "attr", "int", "rank")
            .unwrap()
            .unwrap()
            .required
    );
}

#[rstest]
#[case::both(true, true, true)]
#[case::first_only(true, false, true)]
#[case::second_only(false, true, true)]
#[case::neither(false, false, false)]
fn test_placement_grants_are_a_union(#[case] first: bool, #[case] second: bool, #[case] accepted: bool) {
    let registry = object_registry();
    for (enabled, id) in [(first, "object.attrs.a"), (second, "object.attrs.b")] {
        if enabled {
            registry
                .add_constraint(
                    PlacementConstraint::new(id, "objects carry int attributes")
                        .parent("object", "pojo")
                        .child("attr", "int"),
                )
                .unwrap();
        }
    }
    let mut graph = MetaGraph::new(registry, "metadata", "base", "app").unwrap();
    let basket = graph.attach(graph.root(), "object", "pojo", "Basket").unwrap();
    assert_eq!(graph.attribute(basket, "int", "weight", 3).is_ok(), accepted);
}
