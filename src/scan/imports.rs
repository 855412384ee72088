//! Line-oriented extraction and resolution of relative import specifiers.
//!
//! Only single-line statements are recognized; an import whose `from`
//! clause sits on a later line than `import` is not picked up.

use crate::paths;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*(?:import|export)\s+.*?from\s*['"]([^'"]+)['"]|^\s*import\s*['"]([^'"]+)['"]|\brequire\(\s*['"]([^'"]+)['"]\s*\)"#,
    )
    .expect("import pattern is valid")
});

/// Relative specifiers (`./x`, `../y`) found in `source`, in order.
///
/// Bare package specifiers such as `react` are skipped: they never name a
/// file inside the repository.
pub fn extract_relative_specifiers(source: &str) -> Vec<String> {
    IMPORT_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
        .filter(|spec| spec.starts_with('.'))
        .map(String::from)
        .collect()
}

/// Resolve `specifier`, written in `importer`, against known file ids.
///
/// Candidates are tried in order: the exact path, the path with each
/// extension appended, then `index.<ext>` inside the path as a directory.
pub fn resolve_specifier(
    importer: &str,
    specifier: &str,
    files: &HashSet<String>,
    extensions: &[String],
) -> Option<String> {
    let dir = paths::parent_of(importer).unwrap_or("");
    let base = paths::join_relative(dir, specifier)?;
    if base.is_empty() {
        // `.` from a root-level file can only mean the root index.
        return extensions
            .iter()
            .map(|ext| format!("index.{}", ext))
            .find(|candidate| files.contains(candidate));
    }

    candidates(&base, extensions).find(|candidate| files.contains(candidate))
}

fn candidates<'a>(base: &'a str, extensions: &'a [String]) -> impl Iterator<Item = String> + 'a {
    std::iter::once(base.to_string())
        .chain(extensions.iter().map(move |ext| format!("{}.{}", base, ext)))
        .chain(
            extensions
                .iter()
                .map(move |ext| format!("{}/index.{}", base, ext)),
        )
}
