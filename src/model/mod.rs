mod edge;
mod node;

pub use edge::{GraphEdge, thickness_for};
pub use node::{
    DEFAULT_FOLDER_SIZE, FOLDER_PLACEHOLDER, FileNode, FolderNode, GraphNode, GroupKind, Position,
    Size,
};

use serde::{Deserialize, Serialize};

/// The renderable graph: nested nodes plus direct and derived edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn folders(&self) -> impl Iterator<Item = &FolderNode> {
        self.nodes.iter().filter_map(|n| match n {
            GraphNode::Folder(folder) => Some(folder),
            GraphNode::File(_) => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.iter().filter_map(|n| match n {
            GraphNode::File(file) => Some(file),
            GraphNode::Folder(_) => None,
        })
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn direct_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| !e.derived)
    }

    pub fn derived_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.derived)
    }
}

/// Which path produced a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphOrigin {
    /// Built from a dependency report.
    Report,
    /// Built by the static import scan.
    Scan,
}

impl std::fmt::Display for GraphOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphOrigin::Report => write!(f, "dependency report"),
            GraphOrigin::Scan => write!(f, "static import scan"),
        }
    }
}
