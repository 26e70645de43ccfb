//! Hierarchical value to node/edge conversion

use serde_json::Value;

use crate::classify::{classify, entries};
use crate::config::TransformConfig;
use crate::model::{GraphEdge, GraphNode, NodeId, NodeKind};

/// Label of the synthetic root node.
pub const ROOT_LABEL: &str = "Root";

/// Convert `value` into nodes and edges using the default configuration.
///
/// The root is always `node-0`.
pub fn transform(value: &Value) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    Transformer::new(&TransformConfig::default()).run(value)
}

/// Single-use walker. Owns the id counter and the arena being built, so
/// concurrent or repeated runs never share state.
pub struct Transformer {
    config: TransformConfig,
    next_id: u64,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl Transformer {
    pub fn new(config: &TransformConfig) -> Self {
        Transformer {
            config: *config,
            next_id: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Walk `value` depth-first in entry order and return the arena.
    pub fn run(mut self, value: &Value) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let root = self.push_node(ROOT_LABEL.to_string(), None, NodeKind::Object, 0);
        self.visit_entries(value, root, 1);

        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "Transformed value into graph"
        );
        (self.nodes, self.edges)
    }

    fn visit_entries(&mut self, container: &Value, parent: NodeId, depth: u32) {
        for (key, child) in entries(container) {
            let kind = classify(child);
            let value = (kind == NodeKind::Primitive).then(|| child.clone());
            let id = self.push_node(key, value, kind, depth);
            self.edges.push(GraphEdge::new(parent, id));

            if kind.is_container() {
                self.visit_entries(child, id, depth + 1);
            }
        }
    }

    fn push_node(&mut self, label: String, value: Option<Value>, kind: NodeKind, depth: u32) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(GraphNode {
            id,
            label,
            value,
            kind,
            depth,
            expanded: depth < self.config.expand_depth,
            position: None,
        });
        id
    }
}
