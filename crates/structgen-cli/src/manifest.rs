//! Manifest parsing and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use structgen_core::GeneratorOptions;

/// Default manifest file name, looked up in the working directory
pub const DEFAULT_MANIFEST: &str = "structgen.toml";

/// Placeholder replaced by the module name in `file_pattern`
pub const MODULE_PLACEHOLDER: &str = "{module}";

/// structgen.toml manifest structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub generator: GeneratorOptions,

    #[serde(default)]
    pub output: OutputSection,

    /// Modules to generate; every module of the schema when absent
    #[serde(default)]
    pub modules: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    /// Abort the whole batch when any module fails
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_directory() -> String {
    "generated".to_string()
}

fn default_file_pattern() -> String {
    format!("{MODULE_PLACEHOLDER}Structs.h")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_pattern: default_file_pattern(),
            fail_fast: false,
        }
    }
}

impl Manifest {
    /// Load manifest from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read manifest: {:?}", path.as_ref()))?;

        Self::from_str(&content)
    }

    /// Parse manifest from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse manifest")
    }

    /// Load the manifest at `path`, or `structgen.toml` if it exists, or the
    /// defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_MANIFEST).exists() => Self::from_file(DEFAULT_MANIFEST),
            None => Ok(Self::default()),
        }
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        self.generator
            .validate()
            .context("Invalid [generator] section")?;

        if self.output.directory.is_empty() {
            anyhow::bail!("Output directory cannot be empty");
        }

        let pattern = &self.output.file_pattern;
        if !pattern.contains(MODULE_PLACEHOLDER) {
            anyhow::bail!(
                "Output file_pattern '{}' must contain {}",
                pattern,
                MODULE_PLACEHOLDER
            );
        }
        if pattern.contains('/') || pattern.contains('\\') {
            anyhow::bail!(
                "Output file_pattern '{}' must be a file name, not a path",
                pattern
            );
        }

        if let Some(modules) = &self.modules {
            for module in modules {
                if module.is_empty() {
                    anyhow::bail!("Module names in `modules` cannot be empty");
                }
            }
        }

        Ok(())
    }

    /// Output file name for a module
    pub fn file_name(&self, module: &str) -> String {
        self.output.file_pattern.replace(MODULE_PLACEHOLDER, module)
    }
}

/// Check command implementation
pub fn check(manifest_path: Option<String>) -> Result<()> {
    let path = manifest_path.unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

    println!("Checking manifest: {}", path);

    let manifest = Manifest::from_file(&path)?;
    manifest.validate()?;

    println!("✓ Namespace: {}", manifest.generator.namespace);
    println!(
        "✓ Include guard prefix: {}",
        manifest.generator.include_guard_prefix
    );
    println!(
        "✓ Output: {}/{}",
        manifest.output.directory, manifest.output.file_pattern
    );
    match &manifest.modules {
        Some(modules) => println!("✓ Modules: {}", modules.join(", ")),
        None => println!("✓ Modules: all"),
    }
    println!("\nManifest is valid!");

    Ok(())
}
