//! Struct generation from module schemas.
//!
//! # Architecture
//!
//! ```text
//! MethodSchema + AliasMap
//!     ↓
//!  [collect]   representability check, alias resolution, naming, dedup
//!     ↓
//!   IR (StructDescriptor, dependency order)
//!     ↓
//!  [emit_struct]   declaration, constructor, fromDynamic, toDynamic
//!     ↓
//!  [driver]   header template → one C++ header per module
//! ```
//!
//! # Usage
//!
//! ```rust
//! use structgen_core::codegen::generate;
//! use structgen_core::schema::{AliasMap, MethodSchema, ParamSchema, PrimitiveKind, Property, TypeNode};
//!
//! let methods = vec![MethodSchema {
//!     name: "move".to_string(),
//!     params: vec![ParamSchema {
//!         name: "point".to_string(),
//!         ty: TypeNode::object(vec![
//!             Property::required("x", TypeNode::primitive(PrimitiveKind::Number)),
//!             Property::required("y", TypeNode::primitive(PrimitiveKind::Number)),
//!         ]),
//!     }],
//!     return_type: TypeNode::primitive(PrimitiveKind::Void),
//! }];
//!
//! let header = generate(&methods, &AliasMap::new(), "Sample").unwrap();
//! assert!(header.contains("struct Sample_MovePoint {"));
//! ```
//!
//! # See Also
//!
//! - [`ir`] module for the intermediate representation
//! - [`naming`] module for struct and member naming
//! - [`cpp_types`] module for the C++ type mapping

pub mod collect;
pub mod cpp;
pub mod cpp_types;
pub mod driver;
pub mod ir;
pub mod naming;

pub use collect::{MAX_NAME_SUFFIX, collect};
pub use cpp::{EmittedStruct, emit_struct};
pub use driver::{generate, generate_document, generate_with_options};
pub use ir::{Field, FieldType, Origin, StructDescriptor};
