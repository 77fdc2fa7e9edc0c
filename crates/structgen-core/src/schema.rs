//! Type schema model consumed by the generator.
//!
//! The schema parser (an external tool) produces a [`SchemaDocument`]: one
//! [`ModuleSchema`] per module, each carrying its own [`AliasMap`] and the
//! method signatures whose parameter and return types are described by
//! [`TypeNode`] trees.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "modules": {
//!     "Sample": {
//!       "aliases": {
//!         "Sample.User": {
//!           "type": "object",
//!           "properties": [
//!             { "name": "name", "type": { "type": "primitive", "kind": "string" } },
//!             { "name": "manager", "optional": true, "type": { "type": "alias", "name": "Sample.User" } }
//!           ]
//!         }
//!       },
//!       "methods": [
//!         {
//!           "name": "getUser",
//!           "params": [{ "name": "id", "type": { "type": "primitive", "kind": "number" } }],
//!           "returnType": { "type": "alias", "name": "Sample.User" }
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Equality on every type here is structural, which is what struct
//! deduplication relies on.

use crate::alias;
use crate::error::{GenerateError, GenerateResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Mapping from alias name to its defining type.
pub type AliasMap = BTreeMap<String, TypeNode>;

/// Scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    Bool,
    Number,
    String,
    /// Only meaningful as a method return type.
    Void,
}

/// A node of the type AST.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypeNode {
    Primitive {
        kind: PrimitiveKind,
    },
    #[serde(rename_all = "camelCase")]
    Array {
        element_type: Box<TypeNode>,
    },
    Object {
        #[serde(default)]
        properties: Vec<Property>,
    },
    /// Reference to an entry of the module's [`AliasMap`].
    Alias {
        name: String,
    },
    /// Free-form object payload, passed through untyped.
    GenericObject,
    /// A value that may be `null`.
    Nullable {
        inner: Box<TypeNode>,
    },
    /// String-literal union.
    Enum {
        members: Vec<String>,
    },
}

/// A named member of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeNode,

    #[serde(default)]
    pub optional: bool,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeNode,
}

/// One method of a module interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSchema {
    pub name: String,

    #[serde(default)]
    pub params: Vec<ParamSchema>,

    #[serde(default = "void_type")]
    pub return_type: TypeNode,
}

/// The methods and aliases of a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSchema {
    #[serde(default)]
    pub aliases: AliasMap,

    #[serde(default)]
    pub methods: Vec<MethodSchema>,
}

/// Parser output: every module keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSchema>,
}

fn void_type() -> TypeNode {
    TypeNode::Primitive {
        kind: PrimitiveKind::Void,
    }
}

/// Label used for return types in access paths.
pub const RETURN_TYPE_SEGMENT: &str = "returnType";

impl TypeNode {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeNode::Primitive { kind }
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array {
            element_type: Box::new(element),
        }
    }

    pub fn object(properties: Vec<Property>) -> Self {
        TypeNode::Object { properties }
    }

    pub fn alias(name: impl Into<String>) -> Self {
        TypeNode::Alias { name: name.into() }
    }

    pub fn nullable(inner: TypeNode) -> Self {
        TypeNode::Nullable {
            inner: Box::new(inner),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self,
            TypeNode::Primitive {
                kind: PrimitiveKind::Void
            }
        )
    }
}

impl Property {
    pub fn required(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: true,
        }
    }
}

impl MethodSchema {
    /// Parameter types followed by the return type, in declaration order,
    /// each paired with its access path (`[method, param]` or
    /// `[method, "returnType"]`).
    pub fn type_nodes(&self) -> impl Iterator<Item = (Vec<String>, &TypeNode)> {
        self.params
            .iter()
            .map(|param| (vec![self.name.clone(), param.name.clone()], &param.ty))
            .chain(std::iter::once((
                vec![self.name.clone(), RETURN_TYPE_SEGMENT.to_string()],
                &self.return_type,
            )))
    }
}

impl ModuleSchema {
    /// All method type nodes in declaration order.
    pub fn type_nodes(&self) -> impl Iterator<Item = (Vec<String>, &TypeNode)> {
        self.methods.iter().flat_map(MethodSchema::type_nodes)
    }
}

// ============================================================================
// Representability
// ============================================================================

/// What lies between an alias body (or the checked root) and an alias
/// reference inside it.
#[derive(Debug)]
enum Frame<'a> {
    Property { name: &'a str, guarded: bool },
    Array,
    Nullable,
}

impl Frame<'_> {
    fn is_guard(&self) -> bool {
        matches!(
            self,
            Frame::Array | Frame::Nullable | Frame::Property { guarded: true, .. }
        )
    }

    fn label(&self) -> String {
        match self {
            Frame::Property { name, .. } => (*name).to_string(),
            Frame::Array => "[]".to_string(),
            Frame::Nullable => "?".to_string(),
        }
    }
}

/// One alias reference, as seen from the type that contains it.
#[derive(Debug)]
struct AliasEdge<'a> {
    target: &'a str,
    /// Labels of the frames crossed to reach the reference.
    steps: Vec<String>,
    through_object: bool,
    guarded: bool,
}

/// Every alias reachable from one root node, each with the references its
/// body makes. Each body is visited once, however often it is referenced.
#[derive(Debug, Default)]
struct AliasGraph<'a> {
    names: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    edges: Vec<Vec<AliasEdge<'a>>>,
    roots: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl<'a> AliasGraph<'a> {
    fn build(node: &'a TypeNode, aliases: &'a AliasMap) -> GenerateResult<Self> {
        let mut graph = Self::default();

        let mut root_edges = Vec::new();
        alias_edges(node, &mut Vec::new(), &mut root_edges);
        for edge in &root_edges {
            let index = graph.intern(edge.target);
            graph.roots.push(index);
        }

        while graph.edges.len() < graph.names.len() {
            let name = graph.names[graph.edges.len()];
            let body = alias::resolve(name, aliases)?;
            let mut edges = Vec::new();
            alias_edges(body, &mut Vec::new(), &mut edges);
            for edge in &edges {
                graph.intern(edge.target);
            }
            graph.edges.push(edges);
        }

        Ok(graph)
    }

    fn intern(&mut self, name: &'a str) -> usize {
        if let Some(&index) = self.index.get(name) {
            return index;
        }
        let index = self.names.len();
        self.names.push(name);
        self.index.insert(name, index);
        index
    }

    /// First cycle made only of edges accepted by `keep`, as a path of
    /// alias names and frame labels.
    fn find_cycle(&self, keep: fn(&AliasEdge<'_>) -> bool) -> Option<(String, Vec<String>)> {
        let mut marks = vec![Mark::Unvisited; self.names.len()];
        let mut trail = Vec::new();

        for &root in &self.roots {
            if marks[root] == Mark::Unvisited
                && let Some(cycle) = self.visit(root, keep, &mut marks, &mut trail)
            {
                return Some(cycle);
            }
        }
        None
    }

    fn visit(
        &self,
        node: usize,
        keep: fn(&AliasEdge<'_>) -> bool,
        marks: &mut [Mark],
        trail: &mut Vec<(usize, usize)>,
    ) -> Option<(String, Vec<String>)> {
        marks[node] = Mark::OnStack;

        for (edge_index, edge) in self.edges[node].iter().enumerate() {
            if !keep(edge) {
                continue;
            }
            let target = self.index[edge.target];
            match marks[target] {
                Mark::Done => {}
                Mark::OnStack => {
                    let start = trail
                        .iter()
                        .position(|&(from, _)| from == target)
                        .unwrap_or(trail.len());
                    let mut cycle = trail[start..].to_vec();
                    cycle.push((node, edge_index));

                    let mut path = Vec::new();
                    for (from, taken) in cycle {
                        path.push(self.names[from].to_string());
                        path.extend(self.edges[from][taken].steps.iter().cloned());
                    }
                    path.push(edge.target.to_string());
                    return Some((edge.target.to_string(), path));
                }
                Mark::Unvisited => {
                    trail.push((node, edge_index));
                    let found = self.visit(target, keep, marks, trail);
                    trail.pop();
                    if found.is_some() {
                        return found;
                    }
                }
            }
        }

        marks[node] = Mark::Done;
        None
    }
}

fn alias_edges<'a>(node: &'a TypeNode, frames: &mut Vec<Frame<'a>>, out: &mut Vec<AliasEdge<'a>>) {
    match node {
        TypeNode::Primitive { .. } | TypeNode::GenericObject | TypeNode::Enum { .. } => {}
        TypeNode::Array { element_type } => {
            frames.push(Frame::Array);
            alias_edges(element_type, frames, out);
            frames.pop();
        }
        TypeNode::Nullable { inner } => {
            frames.push(Frame::Nullable);
            alias_edges(inner, frames, out);
            frames.pop();
        }
        TypeNode::Object { properties } => {
            for property in properties {
                frames.push(Frame::Property {
                    name: &property.name,
                    guarded: property.optional,
                });
                alias_edges(&property.ty, frames, out);
                frames.pop();
            }
        }
        TypeNode::Alias { name } => out.push(AliasEdge {
            target: name,
            steps: frames.iter().map(Frame::label).collect(),
            through_object: frames.iter().any(|f| matches!(f, Frame::Property { .. })),
            guarded: frames.iter().any(Frame::is_guard),
        }),
    }
}

/// Check that `node` has a finite by-value representation.
///
/// Alias cycles are accepted only when the cycle passes through an object
/// property and at least one edge on it is optional, nullable or an array.
/// Anything else (`A = { next: A }`, `A = B, B = A`, `A = A[]`) fails with
/// [`GenerateError::RecursiveSchema`].
///
/// A cycle lacks a guard exactly when all of its alias references are
/// unguarded, and misses an object exactly when none of them crosses a
/// property, so both conditions reduce to cycle searches over the alias
/// graph. Runs in time linear in the size of the reachable aliases.
pub fn check_representable(node: &TypeNode, aliases: &AliasMap) -> GenerateResult<()> {
    let graph = AliasGraph::build(node, aliases)?;

    let unguarded = graph.find_cycle(|edge| !edge.guarded);
    let cycle = unguarded.or_else(|| graph.find_cycle(|edge| !edge.through_object));

    match cycle {
        Some((alias, path)) => Err(GenerateError::RecursiveSchema { alias, path }),
        None => Ok(()),
    }
}

/// Boolean form of [`check_representable`].
pub fn is_representable(node: &TypeNode, aliases: &AliasMap) -> bool {
    check_representable(node, aliases).is_ok()
}
