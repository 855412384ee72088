//! Static import scan used when no dependency report is available.
//!
//! Walks the project tree, turns every directory and file into a node, and
//! recovers file-to-file edges from relative `import`/`require` statements.

mod imports;

pub use imports::{extract_relative_specifiers, resolve_specifier};

use crate::config::ScanConfig;
use crate::graph::GraphBuilder;
use crate::paths;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Scan root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to read scan root {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to start scan workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A file whose contents will be searched for imports.
struct SourceFile {
    id: String,
    path: PathBuf,
}

/// Scan `root` and return the discovered nodes and edges.
pub fn scan(root: &Path, config: &ScanConfig) -> Result<GraphBuilder, ScanError> {
    check_root(root)?;

    let mut builder = GraphBuilder::new();
    let sources = walk(root, config, &mut builder);

    tracing::debug!(
        "Walked {}: {} folders, {} files, {} source files",
        root.display(),
        builder.folder_count(),
        builder.file_count(),
        sources.len()
    );

    let known: HashSet<String> = builder.file_ids().map(String::from).collect();
    let links = resolve_all(&sources, &known, config)?;

    for (source, targets) in &links {
        for target in targets {
            builder.add_edge(source, target);
        }
    }

    tracing::debug!("Resolved {} import edges", builder.edge_count());
    Ok(builder)
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = std::fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ScanError::RootNotFound(root.to_path_buf())
        } else {
            ScanError::Unreadable {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    std::fs::read_dir(root).map_err(|source| ScanError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Walk the tree, registering folders and files in walk order.
///
/// Returns the files that should be searched for imports.
fn walk(root: &Path, config: &ScanConfig, builder: &mut GraphBuilder) -> Vec<SourceFile> {
    let ignored: HashSet<String> = config.ignore_dirs.iter().cloned().collect();
    let mut sources = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(config.respect_gitignore)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            entry.depth() == 0 || !is_dir || !is_ignored(entry.file_name(), &ignored)
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let id = paths::relative_id(root, entry.path());
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());

        if is_dir {
            builder.ensure_folder(&id);
        } else if let Some(id) = builder.add_file(&id) {
            if is_source_file(entry.path(), &config.source_extensions) {
                sources.push(SourceFile {
                    id,
                    path: entry.into_path(),
                });
            }
        }
    }

    sources
}

fn is_ignored(name: &OsStr, ignored: &HashSet<String>) -> bool {
    let name = name.to_string_lossy();
    ignored.contains(name.as_ref())
}

fn is_source_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|e| *e == ext))
}

/// Read and resolve every source file on a bounded worker pool.
///
/// Results come back in input order, so edges are appended exactly as a
/// sequential scan would append them.
fn resolve_all(
    sources: &[SourceFile],
    known: &HashSet<String>,
    config: &ScanConfig,
) -> Result<Vec<(String, Vec<String>)>, ScanError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency.max(1))
        .build()?;

    let links: Vec<(String, Vec<String>)> = pool.install(|| {
        sources
            .par_iter()
            .map(|file| {
                let targets: Vec<String> = match std::fs::read(&file.path) {
                    Ok(bytes) => {
                        let content = String::from_utf8_lossy(&bytes);
                        extract_relative_specifiers(&content)
                            .iter()
                            .filter_map(|spec| {
                                resolve_specifier(&file.id, spec, known, &config.resolve_extensions)
                            })
                            .collect()
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read {}: {}", file.path.display(), e);
                        Vec::new()
                    }
                };
                (file.id.clone(), targets)
            })
            .collect()
    });

    Ok(links)
}
