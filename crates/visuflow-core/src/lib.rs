//! Visuflow Core: hierarchy to graph transformation and tree layout

pub mod classify;
pub mod config;
pub mod export;
pub mod graph;
pub mod layout;
pub mod model;
pub mod transform;
pub mod validate;


#[cfg(test)]
pub mod test_utils;

pub use classify::classify;
pub use config::{EngineConfig, LayoutConfig, SubtreeWeight, TransformConfig};
pub use export::{Snapshot, read_snapshot, to_json_string, write_snapshot};
pub use graph::{Bounds, Graph};
pub use layout::{ChildIndex, layout};
pub use model::{EdgeId, GraphEdge, GraphNode, IdParseError, NodeId, NodeKind, Position};
pub use transform::{ROOT_LABEL, Transformer, transform};
pub use validate::InvariantViolation;
