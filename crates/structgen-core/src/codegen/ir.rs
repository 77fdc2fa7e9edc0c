//! Intermediate representation for collected struct shapes.
//!
//! The collector lowers [`TypeNode`](crate::schema::TypeNode) trees into
//! [`StructDescriptor`]s whose fields no longer mention aliases: every
//! object-shaped type is replaced by a reference to a named struct.
//!
//! # Structure
//!
//! - [`StructDescriptor`]: one struct with its fields and where it came from
//! - [`Field`]: a property of the struct with its canonical type
//! - [`FieldType`]: alias-free type representation
//!
//! Field lists derive `Hash` and `Eq`, so two descriptors with the same
//! shape can be found through a hash map keyed by `Vec<Field>`.

/// A collected struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    /// Unique struct name within the module.
    pub name: String,

    /// Fields in property declaration order.
    pub fields: Vec<Field>,

    /// Where the shape was first discovered.
    pub origin: Origin,
}

/// A field of a collected struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Property name as it appears in the dynamic value.
    pub name: String,

    /// Field type.
    pub ty: FieldType,

    /// Whether the property may be absent.
    pub optional: bool,
}

/// Canonical field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Number,
    String,

    /// String restricted to the listed members.
    Enum(Vec<String>),

    /// Untyped dynamic payload.
    Generic,

    Array(Box<FieldType>),

    /// Value that may be `null`.
    Nullable(Box<FieldType>),

    /// Reference to another collected struct by name.
    Struct(String),
}

/// Discovery site of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Object defined directly by the named alias.
    Alias(String),

    /// Object literal reached through the given access path.
    Anonymous(Vec<String>),
}

impl FieldType {
    /// Push every struct name referenced by this type onto `out`.
    pub fn collect_struct_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldType::Bool
            | FieldType::Number
            | FieldType::String
            | FieldType::Enum(_)
            | FieldType::Generic => {}
            FieldType::Array(inner) | FieldType::Nullable(inner) => inner.collect_struct_refs(out),
            FieldType::Struct(name) => out.push(name),
        }
    }

    /// The same type with every struct reference passed through `rename`.
    pub fn map_struct_names(&self, rename: &dyn Fn(&str) -> String) -> FieldType {
        match self {
            FieldType::Bool => FieldType::Bool,
            FieldType::Number => FieldType::Number,
            FieldType::String => FieldType::String,
            FieldType::Enum(members) => FieldType::Enum(members.clone()),
            FieldType::Generic => FieldType::Generic,
            FieldType::Array(inner) => FieldType::Array(Box::new(inner.map_struct_names(rename))),
            FieldType::Nullable(inner) => {
                FieldType::Nullable(Box::new(inner.map_struct_names(rename)))
            }
            FieldType::Struct(name) => FieldType::Struct(rename(name)),
        }
    }
}

impl Field {
    /// The same field with every struct reference passed through `rename`.
    pub fn map_struct_names(&self, rename: &dyn Fn(&str) -> String) -> Field {
        Field {
            name: self.name.clone(),
            ty: self.ty.map_struct_names(rename),
            optional: self.optional,
        }
    }
}

impl StructDescriptor {
    /// Names of the structs this one references, in field order, without
    /// duplicates.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        for field in &self.fields {
            field.ty.collect_struct_refs(&mut refs);
        }

        let mut seen = Vec::with_capacity(refs.len());
        for name in refs {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    /// Whether the struct references itself through any field.
    pub fn is_self_referential(&self) -> bool {
        self.dependencies().contains(&self.name.as_str())
    }
}
