//! Dependency reports produced by an external analyzer.
//!
//! A report lists modules by source path together with their resolved
//! dependencies, in the shape dependency-cruiser emits with
//! `--output-type json`. [`adapt`] turns a report into a [`GraphBuilder`].

mod source;

pub use source::{AnalyzerCommand, JsonReportFile, ReportSource, SourceError};

use crate::graph::GraphBuilder;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyReport {
    #[serde(default)]
    pub modules: Vec<ReportModule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModule {
    pub source: String,
    #[serde(default)]
    pub dependencies: Vec<ReportDependency>,
    /// Runtime builtin such as `fs`; not a repository file.
    #[serde(default)]
    pub core_module: bool,
    #[serde(default)]
    pub could_not_resolve: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportDependency {
    #[serde(default)]
    pub resolved: String,
}

/// Result of asking a report source for a graph.
#[derive(Debug)]
pub enum ReportOutcome {
    /// At least one file node was built.
    Built(GraphBuilder),
    /// The source ran but produced no usable modules.
    NoData,
    /// The source could not produce a report at all.
    Unavailable(SourceError),
}

impl DependencyReport {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl ReportModule {
    fn is_repository_file(&self) -> bool {
        !self.core_module && !self.could_not_resolve
    }
}

/// Fetch a report from `source` and adapt it.
pub fn load(source: &dyn ReportSource) -> ReportOutcome {
    match source.fetch() {
        Ok(Some(report)) => adapt(&report),
        Ok(None) => ReportOutcome::NoData,
        Err(e) => ReportOutcome::Unavailable(e),
    }
}

/// Convert a report into file nodes and direct edges.
///
/// Every module becomes a file node under its folder chain. An edge is
/// kept only when its target is itself a module of the report, so the
/// resulting graph never references a node it does not contain.
pub fn adapt(report: &DependencyReport) -> ReportOutcome {
    let mut builder = GraphBuilder::new();
    let mut sources = Vec::with_capacity(report.modules.len());

    for module in report.modules.iter().filter(|m| m.is_repository_file()) {
        if let Some(id) = builder.add_file(&module.source) {
            sources.push((id, module));
        }
    }

    if builder.file_count() == 0 {
        return ReportOutcome::NoData;
    }

    let mut dropped = 0usize;
    for (source_id, module) in &sources {
        for dependency in &module.dependencies {
            let target = crate::paths::normalize(&dependency.resolved);
            if target.is_empty() || !builder.contains_file(&target) {
                dropped += 1;
                continue;
            }
            builder.add_edge(source_id, &target);
        }
    }

    if dropped > 0 {
        tracing::debug!(
            "Dropped {} report dependencies without a module entry",
            dropped
        );
    }

    ReportOutcome::Built(builder)
}
