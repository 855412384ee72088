//! Path normalization for graph node identifiers.
//!
//! Every node id in the graph is a root-relative path using `/` as the only
//! separator. Folder/file identity and edge linkage rely on exact string
//! equality, so every path that enters the graph goes through [`normalize`].

use std::path::Path;

/// Normalize an OS-style path string into a node identifier.
///
/// Backslashes become `/`, repeated separators collapse, `.` segments and
/// the trailing separator are dropped. `"."` and `""` both map to `""`,
/// the implicit root. `..` segments are kept as-is.
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Root-relative identifier for a filesystem path under `root`.
pub fn relative_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize(&relative.to_string_lossy())
}

/// Final component of a normalized id, used as the node label.
pub fn label_of(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Everything before the final component, or `None` for top-level ids.
pub fn parent_of(id: &str) -> Option<&str> {
    id.rfind('/').map(|idx| &id[..idx])
}

/// Lexically resolve a relative specifier against a normalized directory.
///
/// Returns `None` when the result would climb above the root.
pub fn join_relative(dir: &str, specifier: &str) -> Option<String> {
    let specifier = specifier.replace('\\', "/");
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();

    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
}
