//! Serializable view of a grid's nodes, for debugging and comparisons

use serde::{Deserialize, Serialize};

use super::{NodeGraph, NodeType};
use crate::grid::{GridId, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tile: Tile,
    pub kind: NodeType,
    pub neighbors: Vec<Tile>,
    pub boundary: bool,
}

/// Every node of one grid, sorted by tile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub grid: GridId,
    pub nodes: Vec<NodeSnapshot>,
}

impl GraphSnapshot {
    pub fn node(&self, tile: Tile) -> Option<&NodeSnapshot> {
        self.nodes
            .binary_search_by(|node| node.tile.cmp(&tile))
            .ok()
            .map(|i| &self.nodes[i])
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl NodeGraph {
    pub fn snapshot(&self, grid: GridId) -> GraphSnapshot {
        let mut nodes: Vec<NodeSnapshot> = self
            .iter()
            .filter(|node| node.tile().grid == grid)
            .map(|node| NodeSnapshot {
                tile: node.tile(),
                kind: node.kind(),
                neighbors: self.neighbors_of(node.tile()),
                boundary: node.is_boundary(),
            })
            .collect();
        nodes.sort_unstable_by_key(|node| node.tile);
        GraphSnapshot { grid, nodes }
    }
}
