//! Deterministic grid layout.
//!
//! Top-level folders go on a two-column grid, files on a three-column grid
//! local to their parent group, and folders are sized from their direct
//! file count so the file grid fits inside them.

use crate::model::{FileNode, FolderNode, Position, Size};
use std::collections::HashMap;

const FOLDER_COLUMNS: usize = 2;
const FOLDER_SPACING_X: i64 = 800;
const FOLDER_SPACING_Y: i64 = 700;

const FILE_COLUMNS: usize = 3;
const FILE_OFFSET_X: i64 = 40;
const FILE_OFFSET_Y: i64 = 100;
const FILE_SPACING_X: i64 = 180;
const FILE_SPACING_Y: i64 = 100;

/// Position of the `index`-th top-level folder (sorted by id).
pub fn folder_position(index: usize) -> Position {
    Position {
        x: (index % FOLDER_COLUMNS) as i64 * FOLDER_SPACING_X,
        y: (index / FOLDER_COLUMNS) as i64 * FOLDER_SPACING_Y,
    }
}

/// Position of the `index`-th file inside its parent group.
pub fn file_position(index: usize) -> Position {
    Position {
        x: FILE_OFFSET_X + (index % FILE_COLUMNS) as i64 * FILE_SPACING_X,
        y: FILE_OFFSET_Y + (index / FILE_COLUMNS) as i64 * FILE_SPACING_Y,
    }
}

/// Group size for a folder with `count` direct file children.
///
/// Returns `None` for empty folders, which keep their default size.
pub fn folder_size(count: usize) -> Option<Size> {
    if count == 0 {
        return None;
    }

    let cols = match count {
        0..=4 => 1,
        5..=12 => 2,
        _ => 3,
    };
    let rows = count.div_ceil(cols).max(1);

    Some(Size {
        width: (260 + 180 * cols) as u32,
        height: (160 + 100 * rows) as u32,
    })
}

/// Place top-level folders, then files, then size folders.
pub fn apply(folders: &mut [FolderNode], files: &mut [FileNode]) {
    place_top_level_folders(folders);
    let counts = place_files(files);
    size_folders(folders, &counts);
}

fn place_top_level_folders(folders: &mut [FolderNode]) {
    let mut top_level: Vec<&mut FolderNode> = folders
        .iter_mut()
        .filter(|f| f.parent_id.is_none())
        .collect();
    top_level.sort_by(|a, b| a.id.cmp(&b.id));

    for (i, folder) in top_level.into_iter().enumerate() {
        folder.position = folder_position(i);
    }
}

/// Returns the number of direct file children per folder id.
fn place_files(files: &mut [FileNode]) -> HashMap<String, usize> {
    // The implicit root is keyed by `None`.
    let mut running: HashMap<Option<String>, usize> = HashMap::new();

    for file in files.iter_mut() {
        let slot = running.entry(file.parent_id.clone()).or_insert(0);
        file.position = file_position(*slot);
        *slot += 1;
    }

    running
        .into_iter()
        .filter_map(|(parent, count)| parent.map(|p| (p, count)))
        .collect()
}

fn size_folders(folders: &mut [FolderNode], counts: &HashMap<String, usize>) {
    for folder in folders.iter_mut() {
        let count = counts.get(&folder.id).copied().unwrap_or(0);
        if let Some(size) = folder_size(count) {
            folder.size = size;
        }
    }
}
