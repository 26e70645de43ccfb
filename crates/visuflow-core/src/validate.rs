//! Structural invariant checks for a graph snapshot

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::config::LayoutConfig;
use crate::graph::Graph;
use crate::model::{EdgeId, NodeId};

/// Tolerance for floating point position comparisons.
const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("node id {0} appears more than once")]
    DuplicateId(NodeId),
    #[error("expected exactly one depth-0 node, found {0}")]
    RootCount(usize),
    #[error("root {0} has an incoming edge")]
    RootHasParent(NodeId),
    #[error("graph names {declared} as root, but the depth-0 node is {actual}")]
    RootMismatch { declared: NodeId, actual: NodeId },
    #[error("edge {0} references a missing node")]
    DanglingEdge(EdgeId),
    #[error("node {node} has {count} incoming edges, expected 1")]
    ParentCount { node: NodeId, count: usize },
    #[error("edge {edge} joins depth {source_depth} to depth {target_depth}")]
    DepthStep {
        edge: EdgeId,
        source_depth: u32,
        target_depth: u32,
    },
    #[error("primitive node {0} has outgoing edges")]
    PrimitiveWithChildren(NodeId),
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),
    #[error("siblings {first} and {second} share y = {y}")]
    SiblingCollision { first: NodeId, second: NodeId, y: f64 },
    #[error("node {node} at depth {depth} has x = {x}, expected {expected}")]
    Misaligned {
        node: NodeId,
        depth: u32,
        x: f64,
        expected: f64,
    },
}

impl Graph {
    /// Verify the tree invariants every transformer output satisfies.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut ids = HashSet::with_capacity(self.node_count());
        if let Some(dup) = self.all_nodes().find(|n| !ids.insert(n.id)) {
            return Err(InvariantViolation::DuplicateId(dup.id));
        }

        let roots: Vec<_> = self.all_nodes().filter(|n| n.depth == 0).collect();
        if roots.len() != 1 {
            return Err(InvariantViolation::RootCount(roots.len()));
        }
        let root = roots[0].id;
        if root != self.root() {
            return Err(InvariantViolation::RootMismatch {
                declared: self.root(),
                actual: root,
            });
        }

        let mut incoming: HashMap<NodeId, usize> = HashMap::new();
        for edge in self.all_edges() {
            let (Some(source), Some(target)) = (self.node(edge.source), self.node(edge.target)) else {
                return Err(InvariantViolation::DanglingEdge(edge.id));
            };
            if target.depth != source.depth + 1 {
                return Err(InvariantViolation::DepthStep {
                    edge: edge.id,
                    source_depth: source.depth,
                    target_depth: target.depth,
                });
            }
            if !source.kind.is_container() {
                return Err(InvariantViolation::PrimitiveWithChildren(source.id));
            }
            *incoming.entry(edge.target).or_default() += 1;
        }

        if incoming.contains_key(&root) {
            return Err(InvariantViolation::RootHasParent(root));
        }
        if let Some(orphan) = self.first_unreachable(root) {
            return Err(InvariantViolation::Unreachable(orphan));
        }
        for node in self.all_nodes().filter(|n| n.id != root) {
            let count = incoming.get(&node.id).copied().unwrap_or(0);
            if count != 1 {
                return Err(InvariantViolation::ParentCount { node: node.id, count });
            }
        }
        Ok(())
    }

    /// Verify placement: x is a pure function of depth, and no two direct
    /// siblings share a `y`. Unpositioned graphs pass trivially.
    pub fn check_layout(&self, config: &LayoutConfig) -> Result<(), InvariantViolation> {
        for node in self.all_nodes() {
            let Some(pos) = node.position else { continue };
            let expected = config.origin.x + node.depth as f64 * config.horizontal_spacing;
            if (pos.x - expected).abs() > EPSILON {
                return Err(InvariantViolation::Misaligned {
                    node: node.id,
                    depth: node.depth,
                    x: pos.x,
                    expected,
                });
            }
        }

        for parent in self.all_nodes() {
            let mut seen: Vec<(NodeId, f64)> = Vec::new();
            for &child in self.children(parent.id) {
                let Some(y) = self.node(child).and_then(|n| n.position).map(|p| p.y) else {
                    continue;
                };
                if let Some(&(first, _)) = seen.iter().find(|(_, other)| (other - y).abs() < EPSILON) {
                    return Err(InvariantViolation::SiblingCollision {
                        first,
                        second: child,
                        y,
                    });
                }
                seen.push((child, y));
            }
        }
        Ok(())
    }

    /// First node (in traversal order) that a DFS from `root` never visits.
    fn first_unreachable(&self, root: NodeId) -> Option<NodeId> {
        let mut topology: DiGraph<NodeId, ()> = DiGraph::with_capacity(self.node_count(), self.edge_count());
        let indices: HashMap<NodeId, NodeIndex> = self
            .all_nodes()
            .map(|n| (n.id, topology.add_node(n.id)))
            .collect();
        for edge in self.all_edges() {
            topology.add_edge(indices[&edge.source], indices[&edge.target], ());
        }

        let mut visited = vec![false; topology.node_count()];
        let mut dfs = Dfs::new(&topology, indices[&root]);
        while let Some(idx) = dfs.next(&topology) {
            visited[idx.index()] = true;
        }
        self.all_nodes()
            .find(|n| !visited[indices[&n.id].index()])
            .map(|n| n.id)
    }
}
