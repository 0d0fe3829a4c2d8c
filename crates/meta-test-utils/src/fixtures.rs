//! Registries pre-populated with small, self-contained type sets.

use std::sync::Arc;

use meta_core::{Binding, DeclareChildren, MetaDataRegistry, NodeRole, NodeTemplate, ValueKind};

/// An empty registry with strict duplicate detection.
pub fn fresh_registry() -> Arc<MetaDataRegistry> {
    Arc::new(MetaDataRegistry::new())
}

/// Three-level chain `chain.a` <- `chain.b` <- `chain.c`.
///
/// - `a` declares `attr.string 'label'`, a required `attr.int 'rank'` and any
///   `note` child.
/// - `b` redeclares `rank` as optional and adds `attr.boolean 'hidden'`.
/// - `c` redeclares `hidden` as required and adds `attr.string 'code'`.
pub fn chain_registry() -> Arc<MetaDataRegistry> {
    let registry = fresh_registry();
    let binding = |name: &str| Binding::of(name, NodeTemplate::new(NodeRole::Other));
    registry
        .register_type(binding("ChainA"), |b| {
            b.type_name("chain")
                .sub_type("a")
                .optional_attribute("string", "label")
                .required_attribute("int", "rank")
                .optional_child("note", "*", "*")
        })
        .unwrap();
    registry
        .register_type(binding("ChainB"), |b| {
            b.type_name("chain")
                .sub_type("b")
                .inherits_from("chain", "a")
                .optional_attribute("int", "rank")
                .optional_attribute("boolean", "hidden")
        })
        .unwrap();
    registry
        .register_type(binding("ChainC"), |b| {
            b.type_name("chain")
                .sub_type("c")
                .inherits_from("chain", "b")
                .required_attribute("boolean", "hidden")
                .optional_attribute("string", "code")
        })
        .unwrap();
    registry
}

/// Enough types to build object graphs without the built-in providers:
/// a `metadata.base` root holding `object.pojo` nodes, which hold
/// `field.string` / `field.int` fields and a description. Fields accept
/// `defaultValue` and `required` attributes.
pub fn object_registry() -> Arc<MetaDataRegistry> {
    let registry = fresh_registry();
    registry
        .register_type(Binding::of("Root", NodeTemplate::new(NodeRole::Root)), |b| {
            b.type_name("metadata")
                .sub_type("base")
                .optional_child_array("object", "*", "*")
        })
        .unwrap();
    registry
        .register_type(Binding::of("Pojo", NodeTemplate::new(NodeRole::Object)), |b| {
            b.type_name("object")
                .sub_type("pojo")
                .optional_child_array("field", "*", "*")
                .optional_attribute("string", "description")
        })
        .unwrap();
    registry
        .register_type(Binding::of("Field", NodeTemplate::new(NodeRole::Field)), |b| {
            b.type_name("field")
                .sub_type("base")
                .optional_attribute("string", "defaultValue")
                .optional_attribute("boolean", "required")
        })
        .unwrap();
    for (sub_type, kind) in [("string", ValueKind::String), ("int", ValueKind::Int)] {
        let template = NodeTemplate::new(NodeRole::Field).with_value_kind(kind);
        registry
            .register_type(Binding::of(format!("{sub_type}Field"), template), |b| {
                b.type_name("field").sub_type(sub_type).inherits_from("field", "base")
            })
            .unwrap();
    }
    for (sub_type, kind) in [
        ("string", ValueKind::String),
        ("int", ValueKind::Int),
        ("boolean", ValueKind::Boolean),
    ] {
        let template = NodeTemplate::new(NodeRole::Attribute).with_value_kind(kind);
        registry
            .register_type(Binding::of(format!("{sub_type}Attr"), template), |b| {
                b.type_name("attr").sub_type(sub_type)
            })
            .unwrap();
    }
    registry
}
