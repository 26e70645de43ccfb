//! Immutable, positioned graph snapshot handed to renderers

use std::collections::HashMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::layout::{ChildIndex, layout};
use crate::model::*;
use crate::transform::Transformer;

/// One transformation + layout result. Never patched; a new input builds a new `Graph`.
#[derive(Deserialize)]
#[serde(from = "GraphParts")]
pub struct Graph {
    root: NodeId,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    slots: HashMap<NodeId, usize>,
    children: ChildIndex,
    parents: HashMap<NodeId, NodeId>,
}

#[derive(Deserialize)]
struct GraphParts {
    root: NodeId,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl From<GraphParts> for Graph {
    fn from(parts: GraphParts) -> Self {
        Graph::from_parts(parts.root, parts.nodes, parts.edges)
    }
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Graph", 3)?;
        s.serialize_field("root", &self.root)?;
        s.serialize_field("nodes", &self.nodes)?;
        s.serialize_field("edges", &self.edges)?;
        s.end()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("root", &self.root)
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edges.len())
            .finish()
    }
}

/// Axis-aligned box around every positioned node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

impl Graph {
    /// Transform `value` and lay it out.
    pub fn build(value: &Value, config: &EngineConfig) -> Self {
        let (nodes, edges) = Transformer::new(&config.transform).run(value);
        let root = nodes.first().map(|n| n.id).unwrap_or_default();
        let nodes = layout(nodes, &edges, root, &config.layout);
        Graph::from_parts(root, nodes, edges)
    }

    /// Wrap already-computed nodes and edges, indexing them for lookup.
    pub fn from_parts(root: NodeId, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let slots = nodes.iter().enumerate().map(|(slot, n)| (n.id, slot)).collect();
        let children = ChildIndex::build(&nodes, &edges);
        let mut parents = HashMap::with_capacity(edges.len());
        for edge in &edges {
            parents.entry(edge.target).or_insert(edge.source);
        }

        Graph {
            root,
            nodes,
            edges,
            slots,
            children,
            parents,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> Option<&GraphNode> {
        self.node(self.root)
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in traversal order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edges in creation order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.source == source)
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.target == target)
    }

    /// Direct children in sibling order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.children(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Walk up from `node` to the root, nearest ancestor first.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if parent == node || ancestors.contains(&parent) {
                break;
            }
            ancestors.push(parent);
            current = parent;
        }
        ancestors
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().filter(move |n| n.kind == kind).map(|n| n.id)
    }

    /// Find a node by label (first match in traversal order).
    pub fn find_node_by_label(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.label == label).map(|n| n.id)
    }

    /// Follow a label path down from the root, e.g. `["tables", "users", "columns"]`.
    pub fn find_by_path(&self, path: &[&str]) -> Option<NodeId> {
        path.iter().try_fold(self.root, |current, label| {
            self.children(current)
                .iter()
                .copied()
                .find(|&c| self.node(c).is_some_and(|n| n.label == *label))
        })
    }

    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Bounding box of all positioned nodes, `None` before layout.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.nodes.iter().filter_map(|n| n.position);
        let first = positions.next()?;
        Some(positions.fold(Bounds { min: first, max: first }, |b, p| Bounds {
            min: Position::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Position::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        }))
    }

    pub fn into_parts(self) -> (NodeId, Vec<GraphNode>, Vec<GraphEdge>) {
        (self.root, self.nodes, self.edges)
    }
}
