//! Generator configuration types

use crate::codegen::naming::{is_cpp_identifier, is_cpp_keyword};
use crate::error::{GenerateError, GenerateResult};
use serde::{Deserialize, Serialize};

/// Options that shape the fixed header template
///
/// They never affect struct naming or conversion logic, only the wrapper
/// around the generated declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// C++ namespace wrapping the generated structs (`a::b` nesting allowed)
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Prefix of the include guard macro (`{prefix}_{MODULE}_H`)
    #[serde(default = "default_include_guard_prefix")]
    pub include_guard_prefix: String,
}

fn default_namespace() -> String {
    "structgen::generated".to_string()
}

fn default_include_guard_prefix() -> String {
    "STRUCTGEN".to_string()
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            include_guard_prefix: default_include_guard_prefix(),
        }
    }
}

impl GeneratorOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Set the wrapper namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the include guard prefix
    pub fn with_include_guard_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.include_guard_prefix = prefix.into();
        self
    }

    /// Validate the options
    pub fn validate(&self) -> GenerateResult<()> {
        if self.namespace.is_empty() {
            return Err(GenerateError::InvalidOptions(
                "namespace cannot be empty".to_string(),
            ));
        }

        for (index, segment) in self.namespace.split("::").enumerate() {
            if !is_cpp_identifier(segment) || is_cpp_keyword(segment) {
                return Err(GenerateError::InvalidOptions(format!(
                    "namespace segment '{segment}' is not a valid C++ identifier"
                )));
            }
            // Nested `structgen`, `folly` or `std` would shadow the names the
            // generated conversions refer to.
            let shadows = matches!(segment, "std" | "folly") || (index > 0 && segment == "structgen");
            if shadows {
                return Err(GenerateError::InvalidOptions(format!(
                    "namespace segment '{segment}' would shadow a library namespace"
                )));
            }
        }

        let prefix = &self.include_guard_prefix;
        let valid_prefix = !prefix.is_empty()
            && !prefix.starts_with(|c: char| c.is_ascii_digit())
            && prefix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if !valid_prefix {
            return Err(GenerateError::InvalidOptions(format!(
                "include guard prefix '{prefix}' must be upper-case letters, digits and underscores"
            )));
        }

        Ok(())
    }

    /// Namespace segments in nesting order
    pub fn namespace_segments(&self) -> Vec<&str> {
        self.namespace.split("::").collect()
    }
}
