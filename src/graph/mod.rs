mod aggregate;
mod hierarchy;
pub mod layout;
mod routes;

pub use aggregate::aggregate_edges;
pub use hierarchy::FolderHierarchy;
pub use routes::{AppState, router, serve};

use crate::model::{FileNode, Graph, GraphEdge, GraphNode};
use crate::paths;
use std::collections::{HashMap, HashSet};

/// Per-request graph state.
///
/// Owns every folder, file and direct edge discovered for one build. Both
/// the report adapter and the static scanner fill a builder; [`finish`]
/// runs layout and aggregation and hands back the immutable [`Graph`].
///
/// [`finish`]: GraphBuilder::finish
#[derive(Debug, Default)]
pub struct GraphBuilder {
    folders: FolderHierarchy,
    files: Vec<FileNode>,
    file_index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<(String, String)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`FolderHierarchy::ensure_folder`].
    pub fn ensure_folder(&mut self, path: &str) -> Option<String> {
        self.folders.ensure_folder(path)
    }

    /// Register a file node, materializing its ancestor folders.
    ///
    /// Returns the normalized id, or `None` when the path names the root.
    /// Registering the same file twice keeps the first node.
    pub fn add_file(&mut self, path: &str) -> Option<String> {
        let id = paths::normalize(path);
        if id.is_empty() {
            return None;
        }
        if !self.file_index.contains_key(&id) {
            let parent = paths::parent_of(&id).and_then(|p| self.folders.ensure_folder(p));
            self.file_index.insert(id.clone(), self.files.len());
            self.files.push(FileNode::new(id.clone(), parent));
        }
        Some(id)
    }

    pub fn contains_file(&self, id: &str) -> bool {
        self.file_index.contains_key(id)
    }

    /// Add a direct edge between two registered files.
    ///
    /// Returns `false` when an endpoint is unknown or the edge already exists.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if !self.contains_file(source) || !self.contains_file(target) {
            return false;
        }
        if !self
            .edge_keys
            .insert((source.to_string(), target.to_string()))
        {
            return false;
        }
        self.edges.push(GraphEdge::direct(source, target));
        true
    }

    pub fn file_ids(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.id.as_str())
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Lay out every node, derive folder edges and merge into one graph.
    pub fn finish(self) -> Graph {
        let GraphBuilder {
            folders,
            mut files,
            mut edges,
            ..
        } = self;
        let mut folders = folders.into_folders();

        layout::apply(&mut folders, &mut files);

        let parents: HashMap<&str, Option<&str>> = files
            .iter()
            .map(|f| (f.id.as_str(), f.parent_id.as_deref()))
            .collect();
        let derived = aggregate_edges(&edges, &parents);
        edges.extend(derived);

        let nodes = folders
            .into_iter()
            .map(GraphNode::Folder)
            .chain(files.into_iter().map(GraphNode::File))
            .collect();

        Graph { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parent_chain() {
        let mut builder = GraphBuilder::new();
        assert_eq!(builder.add_file("src\\ui\\button.tsx").as_deref(), Some("src/ui/button.tsx"));
        assert_eq!(builder.add_file("main.ts").as_deref(), Some("main.ts"));
        assert_eq!(builder.add_file("."), None);

        assert_eq!(builder.folder_count(), 2);
        assert_eq!(builder.file_count(), 2);
    }

    #[test]
    fn test_add_edge_requires_known_endpoints_and_dedupes() {
        let mut builder = GraphBuilder::new();
        builder.add_file("a/x.ts");
        builder.add_file("b/y.ts");

        assert!(builder.add_edge("a/x.ts", "b/y.ts"));
        assert!(!builder.add_edge("a/x.ts", "b/y.ts"));
        assert!(!builder.add_edge("a/x.ts", "c/missing.ts"));
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn test_finish_has_no_dangling_parents() {
        let mut builder = GraphBuilder::new();
        for path in ["a/b/c/deep.ts", "a/top.ts", "z/last.ts", "root.ts"] {
            builder.add_file(path);
        }
        builder.add_edge("a/top.ts", "a/b/c/deep.ts");
        builder.add_edge("z/last.ts", "a/top.ts");
        builder.add_edge("root.ts", "z/last.ts");

        let graph = builder.finish();
        let folder_ids: HashSet<_> = graph.folders().map(|f| f.id.as_str()).collect();
        for node in &graph.nodes {
            if let Some(parent) = node.parent_id() {
                assert!(folder_ids.contains(parent), "dangling parent {}", parent);
            }
        }

        let derived: Vec<_> = graph
            .derived_edges()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.weight))
            .collect();
        assert_eq!(derived, vec![("a", "a/b/c", 1), ("z", "a", 1)]);
        assert_eq!(graph.direct_edges().count(), 3);
    }

    #[test]
    fn test_nodes_ordered_folders_then_files() {
        let mut builder = GraphBuilder::new();
        builder.add_file("b/one.ts");
        builder.add_file("a/two.ts");

        let graph = builder.finish();
        let kinds: Vec<bool> = graph.nodes.iter().map(|n| n.is_folder()).collect();
        assert_eq!(kinds, vec![true, true, false, false]);
    }
}
