use crate::model::GraphEdge;
use std::collections::{BTreeMap, HashMap};

/// Derive folder-to-folder edges from file-to-file edges.
///
/// `parents` maps a file id to its folder id (`None` for files at the root).
/// An edge contributes to the `(source folder, target folder)` counter only
/// when both endpoints have a folder and the folders differ.
pub fn aggregate_edges(
    edges: &[GraphEdge],
    parents: &HashMap<&str, Option<&str>>,
) -> Vec<GraphEdge> {
    let mut counts: BTreeMap<(&str, &str), u32> = BTreeMap::new();

    for edge in edges.iter().filter(|e| !e.derived) {
        let source = parents.get(edge.source.as_str()).copied().flatten();
        let target = parents.get(edge.target.as_str()).copied().flatten();

        if let (Some(source), Some(target)) = (source, target) {
            if source != target {
                *counts.entry((source, target)).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|((source, target), weight)| GraphEdge::derived(source, target, weight))
        .collect()
}
