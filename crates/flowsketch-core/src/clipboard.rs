//! Copy/paste buffer holding a detached subgraph.

use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use kurbo::Point;
use std::collections::{HashMap, HashSet};

/// Nodes and edges ready to be inserted by a paste.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PastedSubgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Owned copy of a selection.
///
/// Everything is cloned on copy, so later edits to the live graph cannot
/// reach pending paste data.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer with `nodes` and the edges among them.
    ///
    /// An edge is kept only if both of its endpoints are in `nodes`.
    pub fn copy(&mut self, nodes: &[Node], edges: &[Edge]) {
        let ids: HashSet<&NodeId> = nodes.iter().map(|node| &node.id).collect();
        self.nodes = nodes.to_vec();
        self.edges = edges
            .iter()
            .filter(|edge| ids.contains(&edge.source) && ids.contains(&edge.target))
            .cloned()
            .collect();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Produce a fresh copy of the buffer anchored at `at`.
    ///
    /// The first copied node lands on `at` and the rest keep their relative
    /// offsets. Nodes are numbered `node_<first_counter>`, `node_<first_counter + 1>`, ...
    /// in buffer order; edges are remapped onto the new nodes and named by
    /// `next_edge_id`. Returns `None` for an empty buffer.
    pub fn instantiate(
        &self,
        at: Point,
        first_counter: u64,
        mut next_edge_id: impl FnMut() -> EdgeId,
    ) -> Option<PastedSubgraph> {
        let anchor = self.nodes.first()?.position;
        let offset = at - anchor;

        let mut remap: HashMap<&NodeId, NodeId> = HashMap::with_capacity(self.nodes.len());
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .zip(first_counter..)
            .map(|(node, n)| {
                let id = NodeId::from_counter(n);
                remap.insert(&node.id, id.clone());
                let mut pasted = node.clone();
                pasted.id = id;
                pasted.position = node.position + offset;
                pasted.selected = false;
                pasted
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .filter_map(|edge| {
                let source = remap.get(&edge.source)?.clone();
                let target = remap.get(&edge.target)?.clone();
                let mut pasted = edge.clone();
                pasted.id = next_edge_id();
                pasted.source = source;
                pasted.target = target;
                pasted.selected = false;
                Some(pasted)
            })
            .collect();

        Some(PastedSubgraph { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeData, ShapeKind};

    fn node(n: u64, x: f64, y: f64) -> Node {
        Node::new(
            NodeId::from_counter(n),
            ShapeKind::Rectangle,
            Point::new(x, y),
            NodeData::labeled(format!("rectangle {n}")),
        )
    }

    fn edge(id: &str, source: u64, target: u64) -> Edge {
        Edge::new(
            id.into(),
            NodeId::from_counter(source),
            NodeId::from_counter(target),
        )
    }

    #[test]
    fn test_copy_keeps_only_internal_edges() {
        let mut clipboard = Clipboard::new();
        let nodes = vec![node(1, 0.0, 0.0), node(2, 10.0, 0.0)];
        let edges = vec![edge("in", 1, 2), edge("out", 2, 3)];

        clipboard.copy(&nodes, &edges);

        assert_eq!(clipboard.nodes().len(), 2);
        assert_eq!(clipboard.edges().len(), 1);
        assert_eq!(clipboard.edges()[0].id.as_str(), "in");
    }

    #[test]
    fn test_copy_is_detached() {
        let mut clipboard = Clipboard::new();
        let mut nodes = vec![node(1, 0.0, 0.0)];
        clipboard.copy(&nodes, &[]);

        nodes[0].data.label = "changed".to_string();

        assert_eq!(clipboard.nodes()[0].data.label, "rectangle 1");
    }

    #[test]
    fn test_instantiate_offsets_and_remaps() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(
            &[node(1, 10.0, 10.0), node(2, 60.0, 30.0)],
            &[edge("e", 1, 2)],
        );

        let mut issued = 0;
        let pasted = clipboard
            .instantiate(Point::new(100.0, 200.0), 5, || {
                issued += 1;
                EdgeId::new(format!("fresh_{issued}"))
            })
            .unwrap();

        assert_eq!(pasted.nodes[0].id.as_str(), "node_5");
        assert_eq!(pasted.nodes[1].id.as_str(), "node_6");
        assert_eq!(pasted.nodes[0].position, Point::new(100.0, 200.0));
        assert_eq!(pasted.nodes[1].position, Point::new(150.0, 220.0));

        assert_eq!(pasted.edges.len(), 1);
        assert_eq!(pasted.edges[0].id.as_str(), "fresh_1");
        assert_eq!(pasted.edges[0].source.as_str(), "node_5");
        assert_eq!(pasted.edges[0].target.as_str(), "node_6");
    }

    #[test]
    fn test_instantiate_empty_buffer() {
        let clipboard = Clipboard::new();
        assert!(clipboard
            .instantiate(Point::ORIGIN, 1, || EdgeId::generate())
            .is_none());
    }
}
