//! Struct discovery, naming and deduplication.
//!
//! [`collect`] walks every parameter and return type of a module's methods
//! in declaration order, depth first and left to right, and lowers each
//! object-shaped type into a [`StructDescriptor`]. Children are pushed
//! before their parents, so without recursion a struct always appears after
//! every struct it references.
//!
//! # Naming
//!
//! - Objects defined by an alias take the alias name (see
//!   [`alias_struct_name`]).
//! - Object literals take the module name plus the PascalCase access path
//!   (see [`path_struct_name`]).
//! - A name already taken by a different shape gets `_2`, `_3`, ... up to
//!   [`MAX_NAME_SUFFIX`] in discovery order.
//!
//! # Deduplication
//!
//! Field lists are compared structurally. A shape equal to one collected
//! earlier reuses that struct, and every alias that led to it is mapped to
//! the existing name. A struct whose own name was already handed out to a
//! recursive reference is kept while lowering; once the module is complete,
//! [`merge_equivalent_structs`] folds recursive structs that describe the
//! same shape under different names (`A = { next?: B }`, `B = { next?: A }`)
//! into their earliest member.

use super::ir::{Field, FieldType, Origin, StructDescriptor};
use super::naming::{ELEMENT_SEGMENT, alias_struct_name, path_struct_name, suffixed_name};
use crate::alias;
use crate::error::{GenerateError, GenerateResult};
use crate::schema::{
    AliasMap, MethodSchema, PrimitiveKind, Property, RETURN_TYPE_SEGMENT, TypeNode,
    check_representable,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Highest numeric suffix tried when disambiguating struct names.
pub const MAX_NAME_SUFFIX: usize = 99;

/// Collect the structs of one module in dependency order.
///
/// Every parameter and return type is checked with
/// [`check_representable`] before anything is collected, so unguarded
/// recursion fails without partial work.
pub fn collect(
    methods: &[MethodSchema],
    aliases: &AliasMap,
    module_name: &str,
) -> GenerateResult<Vec<StructDescriptor>> {
    for method in methods {
        for (_, node) in method.type_nodes() {
            check_representable(node, aliases)?;
        }
    }

    let mut collector = Collector::new(module_name, aliases);

    for method in methods {
        for param in &method.params {
            let mut path = vec![method.name.clone(), param.name.clone()];
            collector.lower(&param.ty, &mut path)?;
        }

        if !method.return_type.is_void() {
            let mut path = vec![method.name.clone(), RETURN_TYPE_SEGMENT.to_string()];
            collector.lower(&method.return_type, &mut path)?;
        }
    }

    let structs = merge_equivalent_structs(collector.structs);

    debug!(
        module = module_name,
        structs = structs.len(),
        "collected module structs"
    );

    Ok(structs)
}

/// Merge structs whose shapes agree once recursion is taken into account.
///
/// Structs are partitioned into classes that are refined until stable: two
/// structs share a class when their fields agree with every struct
/// reference replaced by the class of its target. Each class then collapses
/// into its earliest member, so references only ever move to an earlier
/// struct and dependency order is kept.
fn merge_equivalent_structs(structs: Vec<StructDescriptor>) -> Vec<StructDescriptor> {
    let index: HashMap<&str, usize> = structs
        .iter()
        .enumerate()
        .map(|(i, descriptor)| (descriptor.name.as_str(), i))
        .collect();

    let mut classes = vec![0usize; structs.len()];
    let mut class_count = usize::from(!structs.is_empty());
    loop {
        let class_name = |name: &str| match index.get(name) {
            Some(&i) => format!("#{}", classes[i]),
            None => name.to_string(),
        };

        let mut ids: HashMap<Vec<Field>, usize> = HashMap::new();
        let refined: Vec<usize> = structs
            .iter()
            .map(|descriptor| {
                let signature: Vec<Field> = descriptor
                    .fields
                    .iter()
                    .map(|field| field.map_struct_names(&class_name))
                    .collect();
                let next_id = ids.len();
                *ids.entry(signature).or_insert(next_id)
            })
            .collect();

        let stable = ids.len() == class_count;
        class_count = ids.len();
        classes = refined;
        if stable {
            break;
        }
    }

    if class_count == structs.len() {
        return structs;
    }

    let mut representative: HashMap<usize, usize> = HashMap::new();
    for (i, class) in classes.iter().enumerate() {
        representative.entry(*class).or_insert(i);
    }
    let kept_name = |name: &str| match index.get(name) {
        Some(&i) => structs[representative[&classes[i]]].name.clone(),
        None => name.to_string(),
    };

    structs
        .iter()
        .enumerate()
        .filter_map(|(i, descriptor)| {
            if representative[&classes[i]] != i {
                debug!(
                    struct_name = %descriptor.name,
                    merged_into = %kept_name(&descriptor.name),
                    "merged recursive struct with identical shape"
                );
                return None;
            }
            Some(StructDescriptor {
                name: descriptor.name.clone(),
                fields: descriptor
                    .fields
                    .iter()
                    .map(|field| field.map_struct_names(&kept_name))
                    .collect(),
                origin: descriptor.origin.clone(),
            })
        })
        .collect()
}

/// An object whose fields are still being lowered.
struct Pending<'a> {
    node: &'a TypeNode,
    base: String,
    /// Set once a recursive reference needed the name before completion.
    reserved: Option<String>,
}

struct Collector<'a> {
    module_name: &'a str,
    aliases: &'a AliasMap,
    structs: Vec<StructDescriptor>,
    by_shape: HashMap<Vec<Field>, usize>,
    alias_structs: HashMap<&'a str, String>,
    /// Completed objects by node identity, for bodies reached more than once.
    lowered: HashMap<*const TypeNode, String>,
    taken: HashSet<String>,
    pending: Vec<Pending<'a>>,
}

impl<'a> Collector<'a> {
    fn new(module_name: &'a str, aliases: &'a AliasMap) -> Self {
        Self {
            module_name,
            aliases,
            structs: Vec::new(),
            by_shape: HashMap::new(),
            alias_structs: HashMap::new(),
            lowered: HashMap::new(),
            taken: HashSet::new(),
            pending: Vec::new(),
        }
    }

    fn lower(&mut self, node: &'a TypeNode, path: &mut Vec<String>) -> GenerateResult<FieldType> {
        match node {
            TypeNode::Primitive { kind } => match kind {
                PrimitiveKind::Bool => Ok(FieldType::Bool),
                PrimitiveKind::Number => Ok(FieldType::Number),
                PrimitiveKind::String => Ok(FieldType::String),
                PrimitiveKind::Void => Err(GenerateError::invalid_schema(
                    path,
                    "void is only allowed as a method return type",
                )),
            },
            TypeNode::GenericObject => Ok(FieldType::Generic),
            TypeNode::Enum { members } => {
                if members.is_empty() {
                    return Err(GenerateError::invalid_schema(
                        path,
                        "enum must have at least one member",
                    ));
                }
                Ok(FieldType::Enum(members.clone()))
            }
            TypeNode::Array { element_type } => {
                path.push(ELEMENT_SEGMENT.to_string());
                let element = self.lower(element_type, path);
                path.pop();
                Ok(FieldType::Array(Box::new(element?)))
            }
            TypeNode::Nullable { inner } => {
                Ok(FieldType::Nullable(Box::new(self.lower(inner, path)?)))
            }
            TypeNode::Object { properties } => {
                let name = self.lower_object(node, properties, None, path)?;
                Ok(FieldType::Struct(name))
            }
            TypeNode::Alias { .. } => {
                let resolved = alias::resolve_chain(node, self.aliases)?;
                let (TypeNode::Object { properties }, Some(defining)) =
                    (resolved.node, resolved.defining_alias())
                else {
                    return self.lower(resolved.node, path);
                };

                if let Some(existing) = self.alias_structs.get(defining).cloned() {
                    for name in resolved.chain.iter().copied() {
                        self.alias_structs.insert(name, existing.clone());
                    }
                    return Ok(FieldType::Struct(existing));
                }

                let name = self.lower_object(resolved.node, properties, Some(defining), path)?;
                if !self.pending.iter().any(|p| std::ptr::eq(p.node, resolved.node)) {
                    for alias_name in resolved.chain.iter().copied() {
                        self.alias_structs.insert(alias_name, name.clone());
                    }
                }
                Ok(FieldType::Struct(name))
            }
        }
    }

    fn lower_object(
        &mut self,
        node: &'a TypeNode,
        properties: &'a [Property],
        alias: Option<&'a str>,
        path: &mut Vec<String>,
    ) -> GenerateResult<String> {
        if let Some(index) = self.pending.iter().rposition(|p| std::ptr::eq(p.node, node)) {
            return self.reserve_pending(index);
        }
        if let Some(name) = self.lowered.get(&(node as *const TypeNode)) {
            return Ok(name.clone());
        }

        let mut seen = HashSet::new();
        for property in properties {
            if !seen.insert(property.name.as_str()) {
                return Err(GenerateError::invalid_schema(
                    path,
                    format!("duplicate property '{}'", property.name),
                ));
            }
        }

        let (base, origin) = match alias {
            Some(alias) => (
                alias_struct_name(self.module_name, alias),
                Origin::Alias(alias.to_string()),
            ),
            None => (
                path_struct_name(self.module_name, path),
                Origin::Anonymous(path.clone()),
            ),
        };

        self.pending.push(Pending {
            node,
            base: base.clone(),
            reserved: None,
        });
        let fields = self.lower_properties(properties, path);
        let reserved = self.pending.pop().and_then(|p| p.reserved);

        let name = self.finish(fields?, base, reserved, origin)?;
        self.lowered.insert(node as *const TypeNode, name.clone());
        Ok(name)
    }

    fn lower_properties(
        &mut self,
        properties: &'a [Property],
        path: &mut Vec<String>,
    ) -> GenerateResult<Vec<Field>> {
        let mut fields = Vec::with_capacity(properties.len());
        for property in properties {
            path.push(property.name.clone());
            let ty = self.lower(&property.ty, path);
            path.pop();
            fields.push(Field {
                name: property.name.clone(),
                ty: ty?,
                optional: property.optional,
            });
        }
        Ok(fields)
    }

    fn reserve_pending(&mut self, index: usize) -> GenerateResult<String> {
        if let Some(name) = &self.pending[index].reserved {
            return Ok(name.clone());
        }
        let base = self.pending[index].base.clone();
        let name = self.claim_name(&base)?;
        debug!(struct_name = %name, "reserved name for recursive reference");
        self.pending[index].reserved = Some(name.clone());
        Ok(name)
    }

    fn finish(
        &mut self,
        fields: Vec<Field>,
        base: String,
        reserved: Option<String>,
        origin: Origin,
    ) -> GenerateResult<String> {
        if reserved.is_none()
            && let Some(&index) = self.by_shape.get(&fields)
        {
            let existing = self.structs[index].name.clone();
            debug!(
                struct_name = %existing,
                discovered_as = %base,
                "reusing structurally identical struct"
            );
            return Ok(existing);
        }

        let name = match reserved {
            Some(name) => name,
            None => self.claim_name(&base)?,
        };

        debug!(struct_name = %name, fields = fields.len(), "collected struct");
        self.by_shape
            .entry(fields.clone())
            .or_insert(self.structs.len());
        self.structs.push(StructDescriptor {
            name: name.clone(),
            fields,
            origin,
        });
        Ok(name)
    }

    fn claim_name(&mut self, base: &str) -> GenerateResult<String> {
        if self.taken.insert(base.to_string()) {
            return Ok(base.to_string());
        }

        for attempt in 2..=MAX_NAME_SUFFIX {
            let candidate = suffixed_name(base, attempt);
            if self.taken.insert(candidate.clone()) {
                warn!(base, struct_name = %candidate, "struct name taken by a different shape");
                return Ok(candidate);
            }
        }

        Err(GenerateError::NamingCollision {
            base: base.to_string(),
            attempts: MAX_NAME_SUFFIX,
        })
    }
}
