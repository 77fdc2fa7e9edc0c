//! Alias resolution.
//!
//! Pure functions over an [`AliasMap`]; nothing is cached between calls.

use crate::error::{GenerateError, GenerateResult};
use crate::schema::{AliasMap, TypeNode};

/// Follow exactly one alias hop.
pub fn resolve<'a>(name: &str, aliases: &'a AliasMap) -> GenerateResult<&'a TypeNode> {
    aliases.get(name).ok_or_else(|| GenerateError::UnknownAlias {
        name: name.to_string(),
    })
}

/// A node with every leading alias hop followed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'a> {
    /// The first non-alias node.
    pub node: &'a TypeNode,

    /// Aliases traversed to reach `node`, outermost first. Empty when the
    /// input was not an alias.
    pub chain: Vec<&'a str>,
}

impl<'a> Resolved<'a> {
    /// The alias whose definition is `node` itself, if any.
    pub fn defining_alias(&self) -> Option<&'a str> {
        self.chain.last().copied()
    }
}

/// Follow alias hops from `node` until a non-alias node is reached.
///
/// Pure alias loops (`A = B`, `B = A`) fail with
/// [`GenerateError::RecursiveSchema`] instead of spinning.
pub fn resolve_chain<'a>(node: &'a TypeNode, aliases: &'a AliasMap) -> GenerateResult<Resolved<'a>> {
    let mut current = node;
    let mut chain: Vec<&'a str> = Vec::new();

    while let TypeNode::Alias { name } = current {
        if chain.contains(&name.as_str()) {
            let mut path: Vec<String> = chain.iter().map(|n| n.to_string()).collect();
            path.push(name.clone());
            return Err(GenerateError::RecursiveSchema {
                alias: name.clone(),
                path,
            });
        }
        chain.push(name);
        current = resolve(name, aliases)?;
    }

    Ok(Resolved {
        node: current,
        chain,
    })
}
