use serde::{Deserialize, Serialize};

/// A directed edge between two file nodes (direct) or two folder nodes (derived).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub derived: bool,
    pub thickness: u32,
}

impl GraphEdge {
    /// An observed or inferred import between two files.
    pub fn direct(source: &str, target: &str) -> Self {
        Self {
            id: format!("e-{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            weight: 1,
            derived: false,
            thickness: thickness_for(1),
        }
    }

    /// A folder-to-folder edge standing for `weight` file edges.
    pub fn derived(source: &str, target: &str, weight: u32) -> Self {
        let weight = weight.max(1);
        Self {
            id: format!("agg-{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            weight,
            derived: true,
            thickness: thickness_for(weight),
        }
    }
}

/// Saturating thickness class: `1 + min(4, floor(sqrt(weight)))`.
pub fn thickness_for(weight: u32) -> u32 {
    1 + weight.isqrt().min(4)
}
