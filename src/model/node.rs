use crate::paths;
use serde::{Deserialize, Serialize};

/// Placeholder position for folders that the layout never places.
pub const FOLDER_PLACEHOLDER: Position = Position { x: 50, y: 50 };

/// Size of a folder before (or without) child-count sizing.
pub const DEFAULT_FOLDER_SIZE: Size = Size {
    width: 600,
    height: 500,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    #[default]
    Group,
}

/// A directory, rendered as a group that contains other nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: GroupKind,
    pub label: String,
    pub parent_id: Option<String>,
    pub position: Position,
    pub size: Size,
}

/// A single file. Always a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    pub label: String,
    pub parent_id: Option<String>,
    pub position: Position,
}

/// Graph nodes are told apart by shape: only folders carry a size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphNode {
    Folder(FolderNode),
    File(FileNode),
}

impl FolderNode {
    pub fn new(id: String, parent_id: Option<String>) -> Self {
        let label = paths::label_of(&id).to_string();
        Self {
            id,
            kind: GroupKind::Group,
            label,
            parent_id,
            position: FOLDER_PLACEHOLDER,
            size: DEFAULT_FOLDER_SIZE,
        }
    }
}

impl FileNode {
    pub fn new(id: String, parent_id: Option<String>) -> Self {
        let label = paths::label_of(&id).to_string();
        Self {
            id,
            label,
            parent_id,
            position: Position { x: 0, y: 0 },
        }
    }
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Folder(folder) => &folder.id,
            GraphNode::File(file) => &file.id,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            GraphNode::Folder(folder) => folder.parent_id.as_deref(),
            GraphNode::File(file) => file.parent_id.as_deref(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, GraphNode::Folder(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_serializes_with_size_and_group_type() {
        let folder = GraphNode::Folder(FolderNode::new("src/app".into(), Some("src".into())));
        let json = serde_json::to_value(&folder).unwrap();

        assert_eq!(json["id"], "src/app");
        assert_eq!(json["label"], "app");
        assert_eq!(json["parentId"], "src");
        assert_eq!(json["type"], "group");
        assert_eq!(json["size"]["width"], 600);
    }

    #[test]
    fn test_file_serializes_without_size() {
        let file = GraphNode::File(FileNode::new("main.ts".into(), None));
        let json = serde_json::to_value(&file).unwrap();

        assert_eq!(json["label"], "main.ts");
        assert!(json["parentId"].is_null());
        assert!(json.get("size").is_none());
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_untagged_nodes_deserialize_by_shape() {
        let folder: GraphNode = serde_json::from_str(
            r#"{"id":"a","type":"group","label":"a","parentId":null,
                "position":{"x":0,"y":0},"size":{"width":600,"height":500}}"#,
        )
        .unwrap();
        let file: GraphNode = serde_json::from_str(
            r#"{"id":"a/x.ts","label":"x.ts","parentId":"a","position":{"x":40,"y":100}}"#,
        )
        .unwrap();

        assert!(folder.is_folder());
        assert!(!file.is_folder());
        assert_eq!(file.parent_id(), Some("a"));
    }
}
