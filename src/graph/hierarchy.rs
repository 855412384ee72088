use crate::model::FolderNode;
use crate::paths;
use std::collections::HashMap;

/// Lazily materialized folder nodes, one per distinct directory prefix.
///
/// Folders are stored in creation order, which always puts an ancestor
/// before any of its descendants.
#[derive(Debug, Default)]
pub struct FolderHierarchy {
    folders: Vec<FolderNode>,
    index: HashMap<String, usize>,
}

impl FolderHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a folder node exists for `path` and every ancestor of it.
    ///
    /// Returns the folder id, or `None` for the implicit root (`""` or `"."`).
    /// Calling this again with an already materialized path has no effect.
    pub fn ensure_folder(&mut self, path: &str) -> Option<String> {
        let path = paths::normalize(path);
        if path.is_empty() {
            return None;
        }
        if self.index.contains_key(&path) {
            return Some(path);
        }

        // Walk prefixes from the top so parents are created first.
        let mut parent: Option<String> = None;
        let mut prefix = String::with_capacity(path.len());
        for segment in path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            if !self.index.contains_key(&prefix) {
                self.index.insert(prefix.clone(), self.folders.len());
                self.folders
                    .push(FolderNode::new(prefix.clone(), parent.clone()));
            }
            parent = Some(prefix.clone());
        }

        Some(path)
    }

    pub fn get(&self, id: &str) -> Option<&FolderNode> {
        self.index.get(id).map(|&idx| &self.folders[idx])
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FolderNode> {
        self.folders.iter()
    }

    pub fn into_folders(self) -> Vec<FolderNode> {
        self.folders
    }
}
