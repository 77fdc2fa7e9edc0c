//! Module driver: collect, emit and wrap one module in the header template.
//!
//! The header layout is fixed:
//!
//! 1. generated banner and include guard (`{PREFIX}_{MODULE}_H`)
//! 2. standard and folly includes
//! 3. the conversion prelude (`structgen::MissingRequiredFieldError`,
//!    `structgen::TypeMismatchError` and the `structgen::detail` checks),
//!    guarded so several generated headers can share a translation unit
//! 4. the wrapper namespace holding forward declarations, declarations and
//!    inline definitions, each in collection order

use super::collect::collect;
use super::cpp::{EmittedStruct, emit_struct};
use super::naming::include_guard;
use crate::config::GeneratorOptions;
use crate::error::GenerateResult;
use crate::schema::{AliasMap, MethodSchema, SchemaDocument};
use std::collections::BTreeMap;
use tracing::debug;

const CONVERSION_PRELUDE: &str = include_str!("../../templates/conversion_prelude.h");

const INCLUDES: &[&str] = &[
    "<initializer_list>",
    "<memory>",
    "<optional>",
    "<stdexcept>",
    "<string>",
    "<utility>",
    "<vector>",
    "",
    "<folly/dynamic.h>",
];

/// Generate the header for one module with default options.
pub fn generate(
    methods: &[MethodSchema],
    aliases: &AliasMap,
    module_name: &str,
) -> GenerateResult<String> {
    generate_with_options(methods, aliases, module_name, &GeneratorOptions::default())
}

/// Generate the header for one module.
///
/// Any error aborts the module; partial output is never returned.
pub fn generate_with_options(
    methods: &[MethodSchema],
    aliases: &AliasMap,
    module_name: &str,
    options: &GeneratorOptions,
) -> GenerateResult<String> {
    options.validate()?;

    let structs = collect(methods, aliases, module_name)?;
    let emitted = structs
        .iter()
        .map(|descriptor| emit_struct(descriptor, &structs))
        .collect::<GenerateResult<Vec<_>>>()?;

    debug!(
        module = module_name,
        structs = emitted.len(),
        "generated module header"
    );

    Ok(render_header(module_name, options, &emitted))
}

/// Generate every module of a document, sequentially and in name order.
///
/// Failures are reported per module; one failing module does not stop the
/// others.
pub fn generate_document(
    document: &SchemaDocument,
    options: &GeneratorOptions,
) -> BTreeMap<String, GenerateResult<String>> {
    document
        .modules
        .iter()
        .map(|(name, module)| {
            let result = generate_with_options(&module.methods, &module.aliases, name, options);
            (name.clone(), result)
        })
        .collect()
}

fn render_header(module_name: &str, options: &GeneratorOptions, emitted: &[EmittedStruct]) -> String {
    let guard = include_guard(&options.include_guard_prefix, module_name);
    let mut code = String::new();

    // Banner
    code.push_str("/**\n");
    code.push_str(" * This file is generated by structgen. Do not edit.\n");
    code.push_str(" *\n");
    code.push_str(&format!(" * Module: {}\n", module_name.replace("*/", "* /")));
    code.push_str(" */\n\n");

    // Include guard
    code.push_str(&format!("#ifndef {}\n", guard));
    code.push_str(&format!("#define {}\n\n", guard));

    for include in INCLUDES {
        if include.is_empty() {
            code.push('\n');
        } else {
            code.push_str(&format!("#include {}\n", include));
        }
    }
    code.push('\n');

    code.push_str(CONVERSION_PRELUDE);
    code.push('\n');

    code.push_str(&format!("namespace {} {{\n\n", options.namespace));

    if !emitted.is_empty() {
        for item in emitted {
            code.push_str(&format!("struct {};\n", item.name));
        }
        code.push('\n');

        for item in emitted {
            code.push_str(&item.declaration);
            code.push('\n');
        }

        for item in emitted {
            code.push_str(&item.definitions());
            code.push('\n');
        }
    }

    code.push_str(&format!("}} // namespace {}\n\n", options.namespace));
    code.push_str(&format!("#endif // {}\n", guard));

    code
}
