//! structgen CLI - Generate C++ structs and folly::dynamic conversions
//!
//! Commands:
//! - `structgen generate` - Write one header per schema module
//! - `structgen check` - Run generation without writing any files
//! - `structgen check-manifest` - Validate a structgen.toml manifest

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod generate;
mod manifest;

#[derive(Parser)]
#[command(name = "structgen")]
#[command(author, version, about = "Generate C++ structs from module schemas", long_about = None)]
struct Cli {
    /// Log verbosity (overrides RUST_LOG)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate headers for the modules of a schema document
    Generate {
        /// Path to the schema document (JSON)
        #[arg(short, long)]
        schema: String,

        /// Output directory (default: [output].directory of the manifest)
        #[arg(short, long)]
        output: Option<String>,

        /// Path to structgen.toml manifest
        #[arg(short, long)]
        manifest: Option<String>,

        /// Only generate these modules (repeatable)
        #[arg(long = "module")]
        modules: Vec<String>,
    },

    /// Generate without writing, reporting failures per module
    Check {
        /// Path to the schema document (JSON)
        #[arg(short, long)]
        schema: String,

        /// Path to structgen.toml manifest
        #[arg(short, long)]
        manifest: Option<String>,

        /// Only check these modules (repeatable)
        #[arg(long = "module")]
        modules: Vec<String>,
    },

    /// Validate a structgen.toml manifest
    CheckManifest {
        /// Path to structgen.toml (default: ./structgen.toml)
        #[arg(short, long)]
        manifest: Option<String>,
    },
}

fn init_tracing(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Commands::Generate {
            schema,
            output,
            manifest,
            modules,
        } => {
            generate::run(&schema, output, manifest, &modules)?;
        }
        Commands::Check {
            schema,
            manifest,
            modules,
        } => {
            generate::check(&schema, manifest, &modules)?;
        }
        Commands::CheckManifest { manifest } => {
            manifest::check(manifest)?;
        }
    }

    Ok(())
}
