//! Library API for building a graph of a project.
//!
//! # Example
//!
//! ```no_run
//! use repograph::{BuildOptions, build_graph};
//! use std::path::Path;
//!
//! let build = build_graph(Path::new("."), &BuildOptions::default())?;
//! println!(
//!     "{} nodes, {} edges from {}",
//!     build.graph.nodes.len(),
//!     build.graph.edges.len(),
//!     build.origin
//! );
//! # Ok::<(), repograph::RepographError>(())
//! ```

use crate::config::{Config, ConfigError};
use crate::model::{Graph, GraphOrigin};
use crate::report::{self, AnalyzerCommand, JsonReportFile, ReportOutcome, ReportSource};
use crate::scan::{self, ScanError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can escape a graph build.
#[derive(Debug, Error)]
pub enum RepographError {
    /// The specified path could not be found or resolved.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The fallback scan failed; no other path is left.
    #[error("Static import scan failed: {0}")]
    Scan(#[from] ScanError),

    /// IO error while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the build should look for a dependency report first.
#[derive(Debug, Clone, Default)]
pub enum ReportInput {
    /// Skip straight to the static scan.
    #[default]
    None,
    /// Read a report already written to disk.
    File(PathBuf),
    /// Run the analyzer command from the configuration.
    Analyzer,
}

/// Options for [`build_graph`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub report: ReportInput,
    /// Use this configuration instead of loading `.repograph.toml`.
    pub config: Option<Config>,
}

/// A finished graph together with the path that produced it.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub graph: Graph,
    pub origin: GraphOrigin,
}

/// Build the graph for the project at `path`.
pub fn build_graph(path: &Path, options: &BuildOptions) -> Result<GraphBuild, RepographError> {
    let root = path
        .canonicalize()
        .map_err(|_| RepographError::PathNotFound(path.to_path_buf()))?;

    let config = match &options.config {
        Some(config) => config.clone(),
        None => Config::load(&root)?,
    };

    let source: Option<Box<dyn ReportSource>> = match &options.report {
        ReportInput::None => None,
        ReportInput::File(file) => Some(Box::new(JsonReportFile::new(file.clone()))),
        ReportInput::Analyzer => AnalyzerCommand::from_config(&config.report, &root)
            .map(|command| Box::new(command) as Box<dyn ReportSource>),
    };

    assemble(&root, source.as_deref(), &config)
}

/// Try the report source, fall back to the static scan, then lay out.
///
/// Only a scan failure is returned as an error: a missing, failing or empty
/// report source always falls through to the scan.
pub fn assemble(
    root: &Path,
    source: Option<&dyn ReportSource>,
    config: &Config,
) -> Result<GraphBuild, RepographError> {
    let from_report = match source {
        Some(source) => match report::load(source) {
            ReportOutcome::Built(builder) => {
                tracing::info!(
                    "Built {} files from {}",
                    builder.file_count(),
                    source.describe()
                );
                Some(builder)
            }
            ReportOutcome::NoData => {
                tracing::info!(
                    "No modules in {}; falling back to static scan",
                    source.describe()
                );
                None
            }
            ReportOutcome::Unavailable(e) => {
                tracing::warn!(
                    "{} unavailable ({}); falling back to static scan",
                    source.describe(),
                    e
                );
                None
            }
        },
        None => None,
    };

    let (builder, origin) = match from_report {
        Some(builder) => (builder, GraphOrigin::Report),
        None => (scan::scan(root, &config.scan)?, GraphOrigin::Scan),
    };

    let graph = builder.finish();
    tracing::info!(
        "Graph ready: {} nodes, {} edges ({})",
        graph.nodes.len(),
        graph.edges.len(),
        origin
    );

    Ok(GraphBuild { graph, origin })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DependencyReport, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        outcome: fn() -> Result<Option<DependencyReport>, SourceError>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(outcome: fn() -> Result<Option<DependencyReport>, SourceError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ReportSource for Fixed {
        fn fetch(&self) -> Result<Option<DependencyReport>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }

        fn describe(&self) -> String {
            "fixed report".to_string()
        }
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.ts"), "import './b';\n").unwrap();
        std::fs::write(dir.path().join("src/b.ts"), "").unwrap();
        dir
    }

    #[test]
    fn test_report_with_modules_is_used() {
        let dir = tree();
        let source = Fixed::new(|| {
            Ok(Some(
                DependencyReport::from_json(r#"{"modules": [{"source": "only/report.js"}]}"#)
                    .unwrap(),
            ))
        });

        let build = assemble(dir.path(), Some(&source), &Config::default()).unwrap();
        assert_eq!(build.origin, GraphOrigin::Report);
        assert_eq!(build.graph.files().count(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_report_falls_back_to_scan() {
        let dir = tree();
        let source = Fixed::new(|| Ok(Some(DependencyReport::default())));

        let build = assemble(dir.path(), Some(&source), &Config::default()).unwrap();
        assert_eq!(build.origin, GraphOrigin::Scan);
        assert_eq!(build.graph.files().count(), 2);
        assert_eq!(build.graph.direct_edges().count(), 1);
    }

    #[test]
    fn test_malformed_report_falls_back_to_scan() {
        let dir = tree();
        let source = Fixed::new(|| Ok(None));

        let build = assemble(dir.path(), Some(&source), &Config::default()).unwrap();
        assert_eq!(build.origin, GraphOrigin::Scan);
    }

    #[test]
    fn test_unavailable_source_falls_back_to_scan() {
        let dir = tree();
        let source = Fixed::new(|| {
            Err(SourceError::Timeout(std::time::Duration::from_secs(90)))
        });

        let build = assemble(dir.path(), Some(&source), &Config::default()).unwrap();
        assert_eq!(build.origin, GraphOrigin::Scan);
    }

    #[test]
    fn test_scan_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let source = Fixed::new(|| Ok(None));

        let result = assemble(&missing, Some(&source), &Config::default());
        assert!(matches!(result, Err(RepographError::Scan(_))));
    }

    #[test]
    fn test_build_graph_rejects_missing_path() {
        let result = build_graph(Path::new("/nonexistent/repograph/path"), &BuildOptions::default());
        assert!(matches!(result, Err(RepographError::PathNotFound(_))));
    }
}
