//! C++ struct generation from collected descriptors.
//!
//! Each struct is rendered as a declaration plus out-of-line `inline`
//! definitions, so a header can declare every struct before defining any
//! conversion:
//!
//! ```text
//! struct Sample_User {
//!   std::string name;
//!   std::optional<std::shared_ptr<Sample_User>> manager;
//!
//!   Sample_User() = default;
//!   Sample_User(std::string name, std::optional<std::shared_ptr<Sample_User>> manager);
//!
//!   static Sample_User fromDynamic(const folly::dynamic &value);
//!   folly::dynamic toDynamic() const;
//! };
//! ```

use super::cpp_types::{CppType, map_field};
use super::ir::StructDescriptor;
use super::naming::member_name;
use crate::error::{GenerateError, GenerateResult};
use std::collections::HashSet;

/// Identifiers a member may not take because the generated code needs them
/// unshadowed inside the struct scope.
const RESERVED_MEMBER_NAMES: &[&str] = &["std", "folly", "structgen", "fromDynamic", "toDynamic"];

/// Rendered pieces of one struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedStruct {
    pub name: String,

    /// `struct Name { ... };`
    pub declaration: String,

    /// Out-of-line full constructor; `None` for structs without fields.
    pub constructor: Option<String>,

    /// `Name::fromDynamic` definition.
    pub from_dynamic: String,

    /// `Name::toDynamic` definition.
    pub to_dynamic: String,
}

impl EmittedStruct {
    /// All out-of-line definitions, in the order they are written to a header.
    pub fn definitions(&self) -> String {
        let mut code = String::new();
        if let Some(constructor) = &self.constructor {
            code.push_str(constructor);
            code.push('\n');
        }
        code.push_str(&self.from_dynamic);
        code.push('\n');
        code.push_str(&self.to_dynamic);
        code
    }
}

/// One field ready for rendering.
struct Member<'a> {
    key: &'a str,
    ident: String,
    ty: CppType,
    optional: bool,
}

/// Render `descriptor`, which must be an element of `all`.
///
/// Structs placed before `descriptor` in `all` are complete; references to
/// any other struct go through `std::shared_ptr` (see
/// [`map_field_type`](super::cpp_types::map_field_type)).
pub fn emit_struct(
    descriptor: &StructDescriptor,
    all: &[StructDescriptor],
) -> GenerateResult<EmittedStruct> {
    let position = all
        .iter()
        .position(|s| s.name == descriptor.name)
        .ok_or_else(|| GenerateError::UnknownStruct(descriptor.name.clone()))?;

    for dependency in descriptor.dependencies() {
        if !all.iter().any(|s| s.name == dependency) {
            return Err(GenerateError::UnknownStruct(dependency.to_string()));
        }
    }

    let complete: HashSet<&str> = all[..position].iter().map(|s| s.name.as_str()).collect();
    let is_complete = |name: &str| complete.contains(name);

    let idents = member_idents(descriptor, all);
    let members: Vec<Member<'_>> = descriptor
        .fields
        .iter()
        .zip(idents)
        .map(|(field, ident)| Member {
            key: &field.name,
            ident,
            ty: map_field(field, &is_complete),
            optional: field.optional,
        })
        .collect();

    let name = &descriptor.name;

    Ok(EmittedStruct {
        name: name.clone(),
        declaration: generate_declaration(name, &members),
        constructor: generate_constructor(name, &members),
        from_dynamic: generate_from_dynamic(name, &members),
        to_dynamic: generate_to_dynamic(name, &members),
    })
}

/// Member identifiers for every field, unique within the struct.
fn member_idents(descriptor: &StructDescriptor, all: &[StructDescriptor]) -> Vec<String> {
    let mut used = HashSet::new();

    descriptor
        .fields
        .iter()
        .map(|field| {
            let mut ident = member_name(&field.name);
            if RESERVED_MEMBER_NAMES.contains(&ident.as_str())
                || all.iter().any(|s| s.name == ident)
            {
                ident.push('_');
            }

            let mut candidate = ident.clone();
            let mut attempt = 2;
            while !used.insert(candidate.clone()) {
                candidate = format!("{ident}_{attempt}");
                attempt += 1;
            }
            candidate
        })
        .collect()
}

fn generate_declaration(name: &str, members: &[Member<'_>]) -> String {
    let mut code = String::new();

    code.push_str(&format!("struct {} {{\n", name));

    for member in members {
        let initializer = match member.ty {
            CppType::Bool | CppType::Number => "{}",
            _ => "",
        };
        code.push_str(&format!(
            "  {} {}{};\n",
            member.ty.declaration(),
            member.ident,
            initializer
        ));
    }
    if !members.is_empty() {
        code.push('\n');
    }

    code.push_str(&format!("  {}() = default;\n", name));
    if !members.is_empty() {
        let explicit = if members.len() == 1 { "explicit " } else { "" };
        code.push_str(&format!(
            "  {}{}({});\n",
            explicit,
            name,
            constructor_params(members)
        ));
    }

    code.push('\n');
    code.push_str(&format!(
        "  static {} fromDynamic(const folly::dynamic &value);\n",
        name
    ));
    code.push_str("  folly::dynamic toDynamic() const;\n");
    code.push_str("};\n");

    code
}

fn constructor_params(members: &[Member<'_>]) -> String {
    members
        .iter()
        .map(|m| format!("{} {}", m.ty.declaration(), m.ident))
        .collect::<Vec<_>>()
        .join(", ")
}

fn generate_constructor(name: &str, members: &[Member<'_>]) -> Option<String> {
    if members.is_empty() {
        return None;
    }

    let initializers = members
        .iter()
        .map(|m| format!("{0}(std::move({0}))", m.ident))
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!(
        "inline {name}::{name}({})\n    : {} {{}}\n",
        constructor_params(members),
        initializers
    ))
}

fn generate_from_dynamic(name: &str, members: &[Member<'_>]) -> String {
    let mut code = String::new();
    let struct_literal = cpp_string_literal(name);

    code.push_str(&format!(
        "inline {0} {0}::fromDynamic(const folly::dynamic &value) {{\n",
        name
    ));
    code.push_str(&format!(
        "  structgen::detail::expectObject(value, {}, \"<value>\");\n",
        struct_literal
    ));
    code.push_str(&format!("  {} result;\n", name));

    for member in members {
        let key = cpp_string_literal(member.key);
        let context = Context {
            struct_literal: &struct_literal,
            key_literal: &key,
        };

        if member.optional {
            let inner = match &member.ty {
                CppType::Optional(inner) => inner.as_ref(),
                other => other,
            };
            // A present key is converted as-is; `null` is only accepted
            // when the property type itself is nullable or generic.
            code.push_str(&format!(
                "  if (const auto *field = value.get_ptr({})) {{\n",
                key
            ));
            code.push_str(&format!(
                "    result.{} = {};\n",
                member.ident,
                from_dynamic_expr(inner, "(*field)", &context, 0)
            ));
            code.push_str("  }\n");
        } else {
            code.push_str("  {\n");
            code.push_str(&format!(
                "    const auto *field = value.get_ptr({});\n",
                key
            ));
            code.push_str("    if (field == nullptr) {\n");
            code.push_str(&format!(
                "      throw structgen::MissingRequiredFieldError({}, {});\n",
                struct_literal, key
            ));
            code.push_str("    }\n");
            code.push_str(&format!(
                "    result.{} = {};\n",
                member.ident,
                from_dynamic_expr(&member.ty, "(*field)", &context, 0)
            ));
            code.push_str("  }\n");
        }
    }

    code.push_str("  return result;\n");
    code.push_str("}\n");

    code
}

fn generate_to_dynamic(name: &str, members: &[Member<'_>]) -> String {
    let mut code = String::new();

    code.push_str(&format!(
        "inline folly::dynamic {}::toDynamic() const {{\n",
        name
    ));
    code.push_str("  folly::dynamic result = folly::dynamic::object();\n");

    for member in members {
        let key = cpp_string_literal(member.key);
        let source = format!("this->{}", member.ident);

        match (&member.ty, member.optional) {
            (CppType::Optional(inner), true) => {
                code.push_str(&format!("  if ({}) {{\n", source));
                code.push_str(&format!(
                    "    result[{}] = {};\n",
                    key,
                    to_dynamic_expr(inner, &format!("(*{source})"), 0)
                ));
                code.push_str("  }\n");
            }
            (ty, _) => {
                code.push_str(&format!(
                    "  result[{}] = {};\n",
                    key,
                    to_dynamic_expr(ty, &source, 0)
                ));
            }
        }
    }

    code.push_str("  return result;\n");
    code.push_str("}\n");

    code
}

/// Names passed to the runtime checks for error messages.
struct Context<'a> {
    struct_literal: &'a str,
    key_literal: &'a str,
}

/// Expression converting the `folly::dynamic` lvalue `source` to `ty`.
fn from_dynamic_expr(ty: &CppType, source: &str, context: &Context<'_>, depth: usize) -> String {
    let names = format!("{}, {}", context.struct_literal, context.key_literal);

    match ty {
        CppType::Bool => format!("structgen::detail::expectBool({source}, {names})"),
        CppType::Number => format!("structgen::detail::expectNumber({source}, {names})"),
        CppType::String => format!("structgen::detail::expectString({source}, {names})"),
        CppType::Enum(members) => {
            let members = members
                .iter()
                .map(|m| cpp_string_literal(m))
                .collect::<Vec<_>>()
                .join(", ");
            format!("structgen::detail::expectOneOf({source}, {{{members}}}, {names})")
        }
        CppType::Dynamic => format!("folly::dynamic({source})"),
        CppType::Struct(name) => format!("{name}::fromDynamic({source})"),
        CppType::SharedStruct(name) => {
            format!("std::make_shared<{name}>({name}::fromDynamic({source}))")
        }
        CppType::Vector(inner) => {
            let items = format!("items{depth}");
            let item = format!("item{depth}");
            format!(
                "[&]() {{ {decl} {items}; for (const auto &{item} : structgen::detail::expectArray({source}, {names})) {{ {items}.push_back({element}); }} return {items}; }}()",
                decl = ty.declaration(),
                element = from_dynamic_expr(inner, &item, context, depth + 1),
            )
        }
        CppType::Optional(inner) => {
            let decl = ty.declaration();
            format!(
                "({source}.isNull() ? {decl}() : {decl}({}))",
                from_dynamic_expr(inner, source, context, depth)
            )
        }
    }
}

/// Expression converting the C++ value `source` of type `ty` to `folly::dynamic`.
fn to_dynamic_expr(ty: &CppType, source: &str, depth: usize) -> String {
    match ty {
        CppType::Bool | CppType::Number | CppType::String | CppType::Enum(_) => {
            format!("folly::dynamic({source})")
        }
        CppType::Dynamic => source.to_string(),
        CppType::Struct(_) => format!("{source}.toDynamic()"),
        CppType::SharedStruct(_) => {
            format!("({source} ? {source}->toDynamic() : folly::dynamic(nullptr))")
        }
        CppType::Vector(inner) => {
            let items = format!("items{depth}");
            let item = format!("item{depth}");
            format!(
                "[&]() {{ folly::dynamic {items} = folly::dynamic::array(); for (const auto &{item} : {source}) {{ {items}.push_back({element}); }} return {items}; }}()",
                element = to_dynamic_expr(inner, &item, depth + 1),
            )
        }
        CppType::Optional(inner) => format!(
            "({source} ? {} : folly::dynamic(nullptr))",
            to_dynamic_expr(inner, &format!("(*{source})"), depth)
        ),
    }
}

/// Quote `s` as a C++ string literal.
pub fn cpp_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x80 => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
