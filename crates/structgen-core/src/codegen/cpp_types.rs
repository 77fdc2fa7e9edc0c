//! C++ type mappings for struct generation.
//!
//! # Type Mappings
//!
//! | Field type | C++ (required) | C++ (optional property) |
//! |------------|----------------|-------------------------|
//! | `Bool` | `bool` | `std::optional<bool>` |
//! | `Number` | `double` | `std::optional<double>` |
//! | `String`, `Enum` | `std::string` | `std::optional<std::string>` |
//! | `Generic` | `folly::dynamic` | `std::optional<folly::dynamic>` |
//! | `Array(T)` | `std::vector<T>` | `std::optional<std::vector<T>>` |
//! | `Nullable(T)` | `std::optional<T>` | `std::optional<std::optional<T>>` |
//! | `Struct` (declared) | `Name` | `std::optional<Name>` |
//! | `Struct` (not yet declared) | `std::shared_ptr<Name>` | `std::optional<std::shared_ptr<Name>>` |
//!
//! The outer `std::optional` of an optional property records presence of the
//! key, so an optional nullable property keeps absent and `null` apart.
//! Structs that are not complete at the point of use (recursive references) are held through
//! `std::shared_ptr`, except as direct `std::vector` elements, which may be
//! incomplete since C++17.

use super::ir::{Field, FieldType};

/// A C++ member type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CppType {
    Bool,
    Number,
    String,
    /// `std::string` checked against the listed members.
    Enum(Vec<String>),
    /// `folly::dynamic` passed through unchanged.
    Dynamic,
    Struct(String),
    /// Struct held through `std::shared_ptr` because it is incomplete here.
    SharedStruct(String),
    Vector(Box<CppType>),
    Optional(Box<CppType>),
}

impl CppType {
    /// The C++ spelling of the type.
    pub fn declaration(&self) -> String {
        match self {
            CppType::Bool => "bool".to_string(),
            CppType::Number => "double".to_string(),
            CppType::String | CppType::Enum(_) => "std::string".to_string(),
            CppType::Dynamic => "folly::dynamic".to_string(),
            CppType::Struct(name) => name.clone(),
            CppType::SharedStruct(name) => format!("std::shared_ptr<{name}>"),
            CppType::Vector(inner) => format!("std::vector<{}>", inner.declaration()),
            CppType::Optional(inner) => format!("std::optional<{}>", inner.declaration()),
        }
    }
}

/// Map a field type to a C++ type.
///
/// `is_complete` reports whether a struct has been fully declared at the
/// point where the enclosing struct is declared.
pub fn map_field_type(ty: &FieldType, is_complete: &dyn Fn(&str) -> bool) -> CppType {
    map_type(ty, is_complete, false)
}

/// Map a whole field, applying property optionality.
pub fn map_field(field: &Field, is_complete: &dyn Fn(&str) -> bool) -> CppType {
    let ty = map_field_type(&field.ty, is_complete);
    if field.optional {
        CppType::Optional(Box::new(ty))
    } else {
        ty
    }
}

fn map_type(ty: &FieldType, is_complete: &dyn Fn(&str) -> bool, vector_element: bool) -> CppType {
    match ty {
        FieldType::Bool => CppType::Bool,
        FieldType::Number => CppType::Number,
        FieldType::String => CppType::String,
        FieldType::Enum(members) => CppType::Enum(members.clone()),
        FieldType::Generic => CppType::Dynamic,
        FieldType::Array(inner) => CppType::Vector(Box::new(map_type(inner, is_complete, true))),
        FieldType::Nullable(inner) => {
            CppType::Optional(Box::new(map_type(inner, is_complete, false)))
        }
        FieldType::Struct(name) => {
            if vector_element || is_complete(name) {
                CppType::Struct(name.clone())
            } else {
                CppType::SharedStruct(name.clone())
            }
        }
    }
}
