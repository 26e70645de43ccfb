//! Tunables for the transformer and layout engine

use serde::{Deserialize, Serialize};

use crate::model::Position;

/// Depth below which nodes are expanded by default.
pub const DEFAULT_EXPAND_DEPTH: u32 = 3;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub transform: TransformConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Nodes with `depth < expand_depth` get `expanded = true`.
    pub expand_depth: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            expand_depth: DEFAULT_EXPAND_DEPTH,
        }
    }
}

/// How much vertical room a subtree claims before its next sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtreeWeight {
    /// `max(1, direct child count)`. Compact, but deep unbalanced subtrees can overlap.
    #[default]
    DirectChildren,
    /// Number of leaves in the subtree. Subtrees never overlap vertically.
    LeafCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Where the root is placed.
    pub origin: Position,
    /// Horizontal step per depth level.
    pub horizontal_spacing: f64,
    /// Vertical step per unit of subtree weight.
    pub vertical_spacing: f64,
    pub weight: SubtreeWeight,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            origin: Position::new(50.0, 50.0),
            horizontal_spacing: 250.0,
            vertical_spacing: 80.0,
            weight: SubtreeWeight::DirectChildren,
        }
    }
}
