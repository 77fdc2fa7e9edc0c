//! Property-based tests for struct collection and header generation
//!
//! Tests that generation is deterministic, that collected structs are
//! unique by shape and by name, that structs are ordered after their
//! dependencies, and that each struct's conversions read and write the same
//! keys.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use structgen_core::schema::{
    AliasMap, MethodSchema, ParamSchema, PrimitiveKind, Property, TypeNode,
};
use structgen_core::{GenerateError, StructDescriptor, collect, emit_struct, generate};

// Strategy: Generate scalar leaves
fn arb_leaf() -> impl Strategy<Value = TypeNode> {
    prop_oneof![
        Just(TypeNode::primitive(PrimitiveKind::Bool)),
        Just(TypeNode::primitive(PrimitiveKind::Number)),
        Just(TypeNode::primitive(PrimitiveKind::String)),
        Just(TypeNode::GenericObject),
        prop::collection::vec("[a-c]", 1..3).prop_map(|members| TypeNode::Enum { members }),
    ]
}

// Strategy: Generate property lists with unique names from a small pool,
// so equal shapes show up often
fn arb_properties(inner: BoxedStrategy<TypeNode>) -> impl Strategy<Value = Vec<Property>> {
    prop::collection::vec(("[a-d]", inner, any::<bool>()), 0..4).prop_map(|entries| {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|(name, _, _)| seen.insert(name.clone()))
            .map(|(name, ty, optional)| Property { name, ty, optional })
            .collect()
    })
}

// Strategy: Generate alias-free type trees
fn arb_type() -> impl Strategy<Value = TypeNode> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeNode::array),
            inner.clone().prop_map(TypeNode::nullable),
            arb_properties(inner.boxed()).prop_map(TypeNode::object),
        ]
    })
}

// Strategy: Generate methods with unique names
fn arb_methods() -> impl Strategy<Value = Vec<MethodSchema>> {
    prop::collection::vec(
        (
            prop::collection::vec(arb_type(), 0..3),
            prop::option::of(arb_type()),
        ),
        1..4,
    )
    .prop_map(|methods| {
        methods
            .into_iter()
            .enumerate()
            .map(|(i, (params, return_type))| MethodSchema {
                name: format!("method{i}"),
                params: params
                    .into_iter()
                    .enumerate()
                    .map(|(j, ty)| ParamSchema {
                        name: format!("arg{j}"),
                        ty,
                    })
                    .collect(),
                return_type: return_type
                    .unwrap_or_else(|| TypeNode::primitive(PrimitiveKind::Void)),
            })
            .collect()
    })
}

// Strategy: Generate a field type for an alias body, possibly referring to
// any of the `count` aliases (itself included)
fn arb_alias_field(count: usize) -> impl Strategy<Value = TypeNode> {
    let alias = (0..count).prop_map(|i| TypeNode::alias(format!("Shape{i}")));
    prop_oneof![
        3 => arb_leaf(),
        2 => alias.clone(),
        1 => alias.clone().prop_map(TypeNode::array),
        1 => alias.clone().prop_map(|a| TypeNode::array(TypeNode::array(a))),
        1 => alias.prop_map(TypeNode::nullable),
        1 => arb_leaf().prop_map(TypeNode::nullable),
    ]
}

// Strategy: Generate an alias body; direct alias references are optional so
// every cycle is guarded
fn arb_alias_properties(count: usize) -> impl Strategy<Value = Vec<Property>> {
    prop::collection::vec(("[a-d]", arb_alias_field(count), any::<bool>()), 0..4).prop_map(
        |entries| {
            let mut seen = HashSet::new();
            entries
                .into_iter()
                .filter(|(name, _, _)| seen.insert(name.clone()))
                .map(|(name, ty, optional)| {
                    let optional = optional || matches!(ty, TypeNode::Alias { .. });
                    Property { name, ty, optional }
                })
                .collect()
        },
    )
}

// Strategy: Generate mutually recursive object aliases and methods taking them
fn arb_recursive_schema() -> impl Strategy<Value = (AliasMap, Vec<MethodSchema>)> {
    (1usize..5)
        .prop_flat_map(|count| {
            (
                prop::collection::vec(arb_alias_properties(count), count),
                prop::collection::vec(0..count, 1..4),
            )
        })
        .prop_map(|(bodies, entry_points)| {
            let aliases: AliasMap = bodies
                .into_iter()
                .enumerate()
                .map(|(i, properties)| (format!("Shape{i}"), TypeNode::object(properties)))
                .collect();
            let methods = entry_points
                .into_iter()
                .enumerate()
                .map(|(i, target)| MethodSchema {
                    name: format!("method{i}"),
                    params: vec![ParamSchema {
                        name: "arg0".into(),
                        ty: TypeNode::alias(format!("Shape{target}")),
                    }],
                    return_type: TypeNode::primitive(PrimitiveKind::Void),
                })
                .collect();
            (aliases, methods)
        })
}

/// Quoted keys following each occurrence of `marker`.
fn keys_after<'a>(code: &'a str, marker: &str) -> Vec<&'a str> {
    code.split(marker)
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .collect()
}

fn assert_unique(structs: &[StructDescriptor]) -> Result<(), TestCaseError> {
    let mut shapes = HashSet::new();
    let mut names = HashSet::new();
    for descriptor in structs {
        prop_assert!(shapes.insert(descriptor.fields.clone()), "duplicate shape {:?}", descriptor);
        prop_assert!(names.insert(descriptor.name.clone()), "duplicate name {}", descriptor.name);
    }
    Ok(())
}

/// `fromDynamic` reads exactly the keys `toDynamic` writes, each once, and
/// optional members are only written when set.
fn assert_conversions_symmetric(structs: &[StructDescriptor]) -> Result<(), TestCaseError> {
    for descriptor in structs {
        let emitted = emit_struct(descriptor, structs).expect("collected structs emit");

        let read = keys_after(&emitted.from_dynamic, "value.get_ptr(\"");
        let written = keys_after(&emitted.to_dynamic, "result[\"");
        let fields: BTreeSet<&str> = descriptor.fields.iter().map(|f| f.name.as_str()).collect();

        prop_assert_eq!(read.len(), fields.len(), "{}", emitted.from_dynamic);
        prop_assert_eq!(written.len(), fields.len(), "{}", emitted.to_dynamic);
        prop_assert_eq!(read.iter().copied().collect::<BTreeSet<_>>(), fields.clone());
        prop_assert_eq!(written.iter().copied().collect::<BTreeSet<_>>(), fields);

        for field in &descriptor.fields {
            let guarded = format!("  if (this->{0}) {{\n    result[\"{0}\"] = ", field.name);
            let unguarded = format!("\n  result[\"{}\"] = ", field.name);
            let missing = format!(
                "MissingRequiredFieldError(\"{}\", \"{}\")",
                descriptor.name, field.name
            );
            if field.optional {
                prop_assert!(emitted.to_dynamic.contains(&guarded), "{}", emitted.to_dynamic);
                prop_assert!(!emitted.to_dynamic.contains(&unguarded), "{}", emitted.to_dynamic);
                prop_assert!(!emitted.from_dynamic.contains(&missing));
            } else {
                prop_assert!(emitted.to_dynamic.contains(&unguarded), "{}", emitted.to_dynamic);
                prop_assert!(emitted.from_dynamic.contains(&missing));
            }
        }
    }
    Ok(())
}

proptest! {
    /// Property: identical input yields byte-identical output
    #[test]
    fn proptest_generate_is_deterministic(methods in arb_methods()) {
        let first = generate(&methods, &AliasMap::new(), "Sample");
        let second = generate(&methods, &AliasMap::new(), "Sample");

        prop_assert_eq!(first, second);
    }

    /// Property: no two collected structs share a shape or a name
    #[test]
    fn proptest_collected_structs_are_unique(methods in arb_methods()) {
        let structs = collect(&methods, &AliasMap::new(), "Sample")
            .expect("alias-free schemas always collect");

        assert_unique(&structs)?;
    }

    /// Property: recursive aliases never leave two structs with one shape
    #[test]
    fn proptest_recursive_structs_are_unique((aliases, methods) in arb_recursive_schema()) {
        let structs = collect(&methods, &aliases, "Sample")
            .expect("guarded recursive schemas always collect");

        assert_unique(&structs)?;
        for descriptor in &structs {
            for dependency in descriptor.dependencies() {
                prop_assert!(structs.iter().any(|s| s.name == dependency), "dangling {}", dependency);
            }
        }
    }

    /// Property: conversions of alias-free structs are symmetric
    #[test]
    fn proptest_conversions_read_what_they_write(methods in arb_methods()) {
        let structs = collect(&methods, &AliasMap::new(), "Sample")
            .expect("alias-free schemas always collect");

        assert_conversions_symmetric(&structs)?;
    }

    /// Property: conversions of recursive structs are symmetric, and a field
    /// referring to its own struct goes through `std::shared_ptr`
    #[test]
    fn proptest_recursive_conversions_read_what_they_write(
        (aliases, methods) in arb_recursive_schema()
    ) {
        let structs = collect(&methods, &aliases, "Sample")
            .expect("guarded recursive schemas always collect");

        assert_conversions_symmetric(&structs)?;

        for descriptor in &structs {
            let emitted = emit_struct(descriptor, &structs).expect("collected structs emit");
            for field in &descriptor.fields {
                if field.ty == structgen_core::codegen::FieldType::Struct(descriptor.name.clone()) {
                    let pointer = format!("std::shared_ptr<{}>", descriptor.name);
                    let shared = if field.optional {
                        format!("std::optional<{}> {};", pointer, field.name)
                    } else {
                        format!("{} {};", pointer, field.name)
                    };
                    prop_assert!(emitted.declaration.contains(&shared), "{}", emitted.declaration);
                }
            }
        }
    }

    /// Property: without recursion every struct follows its dependencies
    #[test]
    fn proptest_dependencies_precede_dependents(methods in arb_methods()) {
        let structs = collect(&methods, &AliasMap::new(), "Sample")
            .expect("alias-free schemas always collect");

        for (index, descriptor) in structs.iter().enumerate() {
            for dependency in descriptor.dependencies() {
                let position = structs
                    .iter()
                    .position(|s| s.name == dependency)
                    .expect("dependency is collected");
                prop_assert!(position < index, "{} is declared after {}", dependency, descriptor.name);
            }
        }
    }

    /// Property: every struct appears once in the header, declared before it
    /// is defined
    #[test]
    fn proptest_header_declares_each_struct_once(methods in arb_methods()) {
        let structs = collect(&methods, &AliasMap::new(), "Sample")
            .expect("alias-free schemas always collect");
        let header = generate(&methods, &AliasMap::new(), "Sample")
            .expect("alias-free schemas always generate");

        for descriptor in &structs {
            let declaration = format!("struct {} {{\n", descriptor.name);
            let definition = format!("{0}::toDynamic() const", descriptor.name);
            prop_assert_eq!(header.matches(&declaration).count(), 1);
            let declared_at = header.find(&declaration).expect("declared");
            let defined_at = header.find(&definition).expect("defined");
            prop_assert!(declared_at < defined_at);
        }
    }

    /// Property: a ring of aliases with only required edges is rejected,
    /// and one optional edge anywhere makes it representable
    #[test]
    fn proptest_alias_ring_needs_a_guard(
        length in 1usize..5,
        guard in prop::option::of(0usize..5)
    ) {
        let guard = guard.filter(|g| *g < length);
        let mut aliases = AliasMap::new();
        for i in 0..length {
            let next = TypeNode::alias(format!("Ring{}", (i + 1) % length));
            let property = if guard == Some(i) {
                Property::optional("next", next)
            } else {
                Property::required("next", next)
            };
            aliases.insert(format!("Ring{i}"), TypeNode::object(vec![property]));
        }
        let methods = vec![MethodSchema {
            name: "walk".into(),
            params: vec![ParamSchema { name: "start".into(), ty: TypeNode::alias("Ring0") }],
            return_type: TypeNode::primitive(PrimitiveKind::Void),
        }];

        let result = generate(&methods, &aliases, "Sample");

        match guard {
            Some(_) => prop_assert!(result.is_ok(), "{:?}", result),
            None => {
                let is_recursive = matches!(result, Err(GenerateError::RecursiveSchema { .. }));
                prop_assert!(is_recursive, "{:?}", result);
            }
        }
    }
}
