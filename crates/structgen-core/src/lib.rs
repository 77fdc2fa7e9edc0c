//! structgen-core - Struct and conversion code generation for module schemas
//!
//! This crate turns the parsed type schema of a cross-boundary module into
//! a C++ header of plain structs with `folly::dynamic` conversions:
//! - [`schema`] for the input type model and the representability check
//! - [`alias`] for alias resolution
//! - [`codegen`] for struct collection, naming, emission and the module driver
//! - [`GeneratorOptions`] for the header template settings
//! - [`GenerateError`] for error handling

pub mod alias;
pub mod codegen;
mod config;
mod error;
pub mod schema;

pub use codegen::{
    EmittedStruct, StructDescriptor, collect, emit_struct, generate, generate_document,
    generate_with_options,
};
pub use config::GeneratorOptions;
pub use error::{GenerateError, GenerateResult};
pub use schema::{
    AliasMap, MethodSchema, ModuleSchema, ParamSchema, PrimitiveKind, Property, SchemaDocument,
    TypeNode, check_representable, is_representable,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AliasMap, GenerateError, GenerateResult, GeneratorOptions, MethodSchema, ModuleSchema,
        SchemaDocument, TypeNode, generate, generate_with_options,
    };
}
