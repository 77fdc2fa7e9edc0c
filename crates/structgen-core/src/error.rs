//! Error types for struct generation

use thiserror::Error;

/// Result type alias for generation operations
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Error type for generation operations
///
/// Every variant aborts generation of the affected module. The conversion
/// failures of the emitted code (`MissingRequiredFieldError`,
/// `TypeMismatchError`) are not represented here: they only exist as C++
/// exception types inside the generated headers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// An alias cycle is not broken by an optional, nullable or array member
    #[error("recursive alias '{alias}' cannot be represented by value (path: {})", .path.join(" -> "))]
    RecursiveSchema { alias: String, path: Vec<String> },

    /// An alias reference names an alias that is not in the alias map
    #[error("unknown type alias '{name}'")]
    UnknownAlias { name: String },

    /// Deterministic suffixing could not produce a unique struct name
    #[error("could not derive a unique struct name from '{base}' after {attempts} attempts")]
    NamingCollision { base: String, attempts: usize },

    /// The schema contains a shape the generator cannot emit
    #[error("invalid schema at {path}: {reason}")]
    InvalidSchema { path: String, reason: String },

    /// A field references a struct that was never collected
    #[error("struct '{0}' is referenced but was never collected")]
    UnknownStruct(String),

    /// Generator options are malformed
    #[error("invalid generator options: {0}")]
    InvalidOptions(String),
}

impl GenerateError {
    /// Returns a stable numeric code for the error kind
    pub fn error_code(&self) -> u32 {
        match self {
            GenerateError::RecursiveSchema { .. } => 1,
            GenerateError::UnknownAlias { .. } => 2,
            GenerateError::NamingCollision { .. } => 3,
            GenerateError::InvalidSchema { .. } => 4,
            GenerateError::UnknownStruct(_) => 5,
            GenerateError::InvalidOptions(_) => 6,
        }
    }

    /// Whether the error is a generator invariant violation rather than a
    /// problem with the input schema.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GenerateError::NamingCollision { .. } | GenerateError::UnknownStruct(_)
        )
    }

    pub(crate) fn invalid_schema(path: &[String], reason: impl Into<String>) -> Self {
        GenerateError::InvalidSchema {
            path: display_path(path),
            reason: reason.into(),
        }
    }
}

/// Render an access path (`getUser`, `returnType`, `address`) as `getUser.returnType.address`.
pub(crate) fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
