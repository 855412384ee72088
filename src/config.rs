use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".repograph.toml";

pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "__pycache__",
    ".next",
    ".cache",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
];

pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

pub const DEFAULT_RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "json"];

const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scan: ScanConfig,
    pub report: ReportConfig,
}

/// Settings for the static import scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory names pruned from the walk.
    pub ignore_dirs: Vec<String>,
    /// Extensions whose files are read for import statements.
    pub source_extensions: Vec<String>,
    /// Extensions tried, in order, when resolving an extensionless specifier.
    pub resolve_extensions: Vec<String>,
    /// Upper bound on worker threads reading files.
    pub concurrency: usize,
    pub respect_gitignore: bool,
}

/// Settings for the out-of-process dependency analyzer.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Program and arguments; `{target}` is replaced with the analyzed directory.
    pub command: Vec<String>,
    pub timeout_secs: u64,
    /// Analyze `<root>/src` when it exists.
    pub prefer_src: bool,
    /// Rerun once on the whole root, shallower, after a failed run.
    pub retry: bool,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    scan: Option<RawScan>,
    report: Option<RawReport>,
}

#[derive(Debug, Deserialize)]
struct RawScan {
    ignore_dirs: Option<Vec<String>>,
    source_extensions: Option<Vec<String>>,
    resolve_extensions: Option<Vec<String>>,
    concurrency: Option<usize>,
    respect_gitignore: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    command: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    prefer_src: Option<bool>,
    retry: Option<bool>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: owned(DEFAULT_IGNORE_DIRS),
            source_extensions: owned(DEFAULT_SOURCE_EXTENSIONS),
            resolve_extensions: owned(DEFAULT_RESOLVE_EXTENSIONS),
            concurrency: DEFAULT_CONCURRENCY,
            respect_gitignore: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            command: owned(&[
                "npx",
                "depcruise",
                "{target}",
                "--no-config",
                "--exclude",
                "(node_modules|dist|build|\\.git|\\.next|\\.cache|\\.github)",
                "--max-depth",
                "4",
                "--do-not-follow",
                "^(node_modules|npm:)",
                "--output-type",
                "json",
            ]),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            prefer_src: true,
            retry: true,
        }
    }
}

impl Config {
    /// Load `.repograph.toml` from the project root, or defaults if absent.
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let scan = match raw.scan {
            Some(s) => ScanConfig {
                ignore_dirs: s.ignore_dirs.unwrap_or(defaults.scan.ignore_dirs),
                source_extensions: s
                    .source_extensions
                    .map(|exts| normalize_extensions(&exts))
                    .unwrap_or(defaults.scan.source_extensions),
                resolve_extensions: s
                    .resolve_extensions
                    .map(|exts| normalize_extensions(&exts))
                    .unwrap_or(defaults.scan.resolve_extensions),
                concurrency: s.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
                respect_gitignore: s.respect_gitignore.unwrap_or(false),
            },
            None => defaults.scan,
        };

        let report = match raw.report {
            Some(r) => ReportConfig {
                command: r.command.unwrap_or(defaults.report.command),
                timeout_secs: r.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                prefer_src: r.prefer_src.unwrap_or(true),
                retry: r.retry.unwrap_or(true),
            },
            None => defaults.report,
        };

        Ok(Self { scan, report })
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Accept both `ts` and `.ts` in the config file.
fn normalize_extensions(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Starter `.repograph.toml` written by `repograph init`.
pub fn generate_config_template() -> String {
    format!(
        r#"# repograph configuration

[scan]
# Directories pruned from the fallback import scan.
ignore_dirs = [{ignore}]

# Files with these extensions are read for import/require statements.
source_extensions = [{source}]

# Tried in order when an import has no extension ("./b" -> "./b.ts", "./b/index.ts").
resolve_extensions = [{resolve}]

# Worker threads used to read source files.
concurrency = {concurrency}

# Also skip files excluded by .gitignore.
respect_gitignore = false

[report]
# Analyzer printing a dependency-cruiser style JSON report on stdout.
# "{{target}}" is replaced with the analyzed directory. Used with --analyzer.
# command = ["npx", "depcruise", "{{target}}", "--no-config", "--output-type", "json"]
timeout_secs = {timeout}

# Analyze src/ (restricted to ^src) when the project has one.
prefer_src = true

# After a failed run, retry once on the whole project with --max-depth 2.
retry = true
"#,
        ignore = quoted(DEFAULT_IGNORE_DIRS),
        source = quoted(DEFAULT_SOURCE_EXTENSIONS),
        resolve = quoted(DEFAULT_RESOLVE_EXTENSIONS),
        concurrency = DEFAULT_CONCURRENCY,
        timeout = DEFAULT_TIMEOUT_SECS,
    )
}

fn quoted(items: &[&str]) -> String {
    items
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ")
}
