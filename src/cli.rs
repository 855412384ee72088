use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repograph")]
#[command(about = "Build a nested folder/file dependency graph for visualization")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to analyze (defaults to current directory)
    /// Used when no subcommand is specified
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the graph and print it as JSON (default behavior)
    Build(BuildArgs),

    /// Serve the graph over HTTP
    Serve(ServeArgs),

    /// Generate a starter .repograph.toml configuration file
    Init(InitArgs),
}

/// Where to look for a dependency report before scanning.
#[derive(Parser, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Dependency report JSON (dependency-cruiser format) to use instead of scanning
    #[arg(long, conflicts_with = "analyzer")]
    pub report: Option<PathBuf>,

    /// Run the analyzer command from .repograph.toml to produce the report
    #[arg(long)]
    pub analyzer: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Path to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    #[command(flatten)]
    pub source: ReportArgs,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            source: ReportArgs::default(),
            output: None,
            compact: false,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Path to analyze at startup (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    #[command(flatten)]
    pub source: ReportArgs,

    /// Port for HTTP server
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Seconds allowed for each /api/analyze build
    #[arg(long, default_value = "120")]
    pub timeout: u64,

    /// Browser origin allowed to call /api/analyze (repeatable)
    #[arg(long = "allow-origin", value_name = "ORIGIN")]
    pub allow_origins: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .repograph.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}
