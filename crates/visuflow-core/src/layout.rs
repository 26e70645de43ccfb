//! Two-pass tree layout: subtree weights, then positions.
//!
//! Children sit one `horizontal_spacing` to the right of their parent and are
//! stacked downward from the parent's `y`. Each sibling is pushed down by the
//! previous sibling's subtree weight times `vertical_spacing`. Weight is either
//! the direct child count (compact, the default) or the leaf count (no overlap),
//! see [`SubtreeWeight`].

use std::collections::{HashMap, HashSet};

use crate::config::{LayoutConfig, SubtreeWeight};
use crate::model::{GraphEdge, GraphNode, NodeId, Position};

/// Parent to ordered child ids, built once from the edge list.
///
/// Sibling order is edge insertion order. Edges pointing at unknown nodes are
/// dropped here, so the rest of the layout never sees them.
#[derive(Debug, Default)]
pub struct ChildIndex {
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl ChildIndex {
    pub fn build(nodes: &[GraphNode], edges: &[GraphEdge]) -> Self {
        let slots = slot_map(nodes);
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for edge in edges {
            if !slots.contains_key(&edge.source) || !slots.contains_key(&edge.target) {
                tracing::debug!("Skipping edge {} with a missing endpoint", edge.id);
                continue;
            }
            children.entry(edge.source).or_default().push(edge.target);
        }

        ChildIndex { children }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }
}

/// Assign a position to every node reachable from `root`.
///
/// Consumes the node list and hands it back positioned; edges are untouched.
/// Nodes not reachable from `root` keep `position = None`. An unknown `root`
/// returns the nodes unchanged.
pub fn layout(
    mut nodes: Vec<GraphNode>,
    edges: &[GraphEdge],
    root: NodeId,
    config: &LayoutConfig,
) -> Vec<GraphNode> {
    let slots = slot_map(&nodes);
    let Some(&root_slot) = slots.get(&root) else {
        tracing::warn!("Layout root {} not found, leaving {} nodes unplaced", root, nodes.len());
        return nodes;
    };

    let index = ChildIndex::build(&nodes, edges);
    let weights = subtree_weights(&index, root, config.weight);

    nodes[root_slot].position = Some(config.origin);
    let mut placer = Placer {
        nodes: &mut nodes,
        slots: &slots,
        index: &index,
        weights: &weights,
        config,
    };
    placer.place_children(root, config.origin);

    tracing::debug!(nodes = slots.len(), "Layout complete");
    nodes
}

/// First pass: weight of every node reachable from `root`, children before parents.
fn subtree_weights(index: &ChildIndex, root: NodeId, strategy: SubtreeWeight) -> HashMap<NodeId, u64> {
    let mut weights = HashMap::new();
    let mut visiting = HashSet::new();
    // post-order without recursion: (node, children_pushed)
    let mut stack = vec![(root, false)];

    while let Some((id, expanded)) = stack.pop() {
        if weights.contains_key(&id) || (!expanded && !visiting.insert(id)) {
            continue;
        }
        let children = index.children(id);
        if expanded || children.is_empty() {
            let weight = match strategy {
                SubtreeWeight::DirectChildren => children.len().max(1) as u64,
                SubtreeWeight::LeafCount => children
                    .iter()
                    .map(|c| weights.get(c).copied().unwrap_or(1))
                    .sum::<u64>()
                    .max(1),
            };
            weights.insert(id, weight);
        } else {
            stack.push((id, true));
            stack.extend(children.iter().rev().map(|&c| (c, false)));
        }
    }

    weights
}

/// Second pass state.
struct Placer<'a> {
    nodes: &'a mut [GraphNode],
    slots: &'a HashMap<NodeId, usize>,
    index: &'a ChildIndex,
    weights: &'a HashMap<NodeId, u64>,
    config: &'a LayoutConfig,
}

impl Placer<'_> {
    /// Place each child of `parent` (already at `at`), depth-first in sibling order.
    fn place_children(&mut self, parent: NodeId, at: Position) {
        let x = at.x + self.config.horizontal_spacing;
        let mut y = at.y;
        let index = self.index;

        for &child in index.children(parent) {
            let slot = self.slots[&child];
            if self.nodes[slot].position.is_some() {
                // reached twice: not a tree, keep the first placement
                continue;
            }
            let pos = Position::new(x, y);
            self.nodes[slot].position = Some(pos);
            self.place_children(child, pos);

            let weight = self.weights.get(&child).copied().unwrap_or(1);
            y += weight as f64 * self.config.vertical_spacing;
        }
    }
}

fn slot_map(nodes: &[GraphNode]) -> HashMap<NodeId, usize> {
    nodes.iter().enumerate().map(|(slot, n)| (n.id, slot)).collect()
}
