//! Header generation from a schema document
//!
//! Modules are generated in parallel, one rayon task per module, and the
//! results are written afterwards in module name order.

use crate::manifest::Manifest;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use structgen_core::{GenerateResult, GeneratorOptions, ModuleSchema, SchemaDocument};
use tracing::{debug, info, warn};

/// Result of generating one module.
#[derive(Debug)]
pub struct ModuleOutcome {
    pub module: String,
    pub result: GenerateResult<String>,
}

/// Load a schema document from a JSON file.
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaDocument> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read schema: {path:?}"))?;

    serde_json::from_str(&content).with_context(|| format!("Failed to parse schema: {path:?}"))
}

/// Modules to generate, in name order.
///
/// Modules named on the command line take precedence over the manifest's
/// `modules` list. Naming a module the schema does not contain is an error,
/// and so is selecting a module whose name cannot be used as a file name.
pub fn select_modules<'a>(
    document: &'a SchemaDocument,
    manifest: &Manifest,
    requested: &[String],
) -> Result<Vec<(&'a str, &'a ModuleSchema)>> {
    let filter = if requested.is_empty() {
        manifest.modules.as_deref()
    } else {
        Some(requested)
    };

    if let Some(filter) = filter {
        for name in filter {
            if !document.modules.contains_key(name) {
                anyhow::bail!("Module '{}' is not defined in the schema", name);
            }
        }
    }

    let selected: Vec<(&str, &ModuleSchema)> = document
        .modules
        .iter()
        .filter(|(name, _)| filter.is_none_or(|filter| filter.contains(*name)))
        .map(|(name, module)| (name.as_str(), module))
        .collect();

    for (name, _) in &selected {
        validate_module_name(name)?;
    }

    Ok(selected)
}

/// Module names end up in output file names, so each must stay a single
/// path component.
fn validate_module_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        anyhow::bail!("Module name '{}' cannot be used as a file name", name);
    }
    if name.contains(['/', '\\', '\0']) {
        anyhow::bail!(
            "Module name '{}' must not contain path separators",
            name.escape_default()
        );
    }
    Ok(())
}

/// Generate every selected module in parallel.
pub fn generate_all(
    modules: &[(&str, &ModuleSchema)],
    options: &GeneratorOptions,
) -> Vec<ModuleOutcome> {
    modules
        .par_iter()
        .map(|(name, module)| {
            debug!(module = %name, "generating module");
            let result = structgen_core::generate_with_options(
                &module.methods,
                &module.aliases,
                name,
                options,
            );
            ModuleOutcome {
                module: name.to_string(),
                result,
            }
        })
        .collect()
}

/// Summary of a batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<String>,
}

/// Write successful outcomes to `directory`.
///
/// With `fail_fast` the first failure (in module order) aborts the batch
/// before anything is written. Otherwise failing modules are skipped and
/// listed in the summary.
pub fn write_outcomes(
    outcomes: &[ModuleOutcome],
    manifest: &Manifest,
    directory: &Path,
) -> Result<BatchSummary> {
    if manifest.output.fail_fast
        && let Some(failure) = outcomes.iter().find(|o| o.result.is_err())
        && let Err(err) = &failure.result
    {
        anyhow::bail!("Module '{}' failed: {}", failure.module, err);
    }

    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create directory: {directory:?}"))?;

    let mut summary = BatchSummary::default();

    for outcome in outcomes {
        match &outcome.result {
            Ok(header) => {
                let path = directory.join(manifest.file_name(&outcome.module));
                fs::write(&path, header).with_context(|| format!("Failed to write {path:?}"))?;
                info!(module = %outcome.module, path = %path.display(), "wrote header");
                summary.written.push(path);
            }
            Err(err) => {
                warn!(module = %outcome.module, error = %err, code = err.error_code(), "module skipped");
                summary.failed.push(outcome.module.clone());
            }
        }
    }

    Ok(summary)
}

/// Generate command implementation
pub fn run(
    schema: &str,
    output: Option<String>,
    manifest_path: Option<String>,
    modules: &[String],
) -> Result<()> {
    let manifest = Manifest::load(manifest_path.as_deref())?;
    manifest.validate()?;

    let document = load_schema(schema)?;
    let selected = select_modules(&document, &manifest, modules)?;
    let directory = PathBuf::from(output.unwrap_or_else(|| manifest.output.directory.clone()));

    println!(
        "Generating {} module(s) from {} into {}",
        selected.len(),
        schema,
        directory.display()
    );

    let outcomes = generate_all(&selected, &manifest.generator);
    let summary = write_outcomes(&outcomes, &manifest, &directory)?;

    for path in &summary.written {
        println!("✓ {}", path.display());
    }
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            eprintln!("✗ {}: {}", outcome.module, err);
        }
    }

    if !summary.failed.is_empty() {
        anyhow::bail!(
            "{} of {} module(s) failed: {}",
            summary.failed.len(),
            outcomes.len(),
            summary.failed.join(", ")
        );
    }

    Ok(())
}

/// Check command implementation: generate without writing
pub fn check(schema: &str, manifest_path: Option<String>, modules: &[String]) -> Result<()> {
    let manifest = Manifest::load(manifest_path.as_deref())?;
    manifest.validate()?;

    println!("Checking schema: {}", schema);

    let document = load_schema(schema)?;
    let selected = select_modules(&document, &manifest, modules)?;
    let outcomes = generate_all(&selected, &manifest.generator);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(_) => println!("✓ {}", outcome.module),
            Err(err) => {
                failed += 1;
                println!("✗ {}: {}", outcome.module, err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} module(s) failed", failed, outcomes.len());
    }

    println!("\nSchema is valid!");

    Ok(())
}
