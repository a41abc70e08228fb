//! The graph store: canonical node/edge collections and the ID counter.
//!
//! Collections live behind `Arc` and are only ever replaced, never edited
//! in place. Taking a [`Snapshot`] is therefore just two reference-count
//! bumps, and a snapshot can never observe a later commit.

use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use std::collections::HashSet;
use std::sync::Arc;

/// The full node/edge graph at one instant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    nodes: Arc<Vec<Node>>,
    edges: Arc<Vec<Edge>>,
}

impl Snapshot {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.nodes, &other.nodes) || self.nodes == other.nodes)
            && (Arc::ptr_eq(&self.edges, &other.edges) || self.edges == other.edges)
    }
}

/// Owner of the live graph.
///
/// No validation happens here; editing operations check their inputs and
/// hand the store finished collections.
#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: Arc<Vec<Node>>,
    edges: Arc<Vec<Edge>>,
    /// Next value used for `node_<n>`. Never decreases except on an explicit
    /// canvas clear.
    node_id_counter: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(Vec::new()),
            edges: Arc::new(Vec::new()),
            node_id_counter: 1,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_id_counter(&self) -> u64 {
        self.node_id_counter
    }

    pub(crate) fn set_node_id_counter(&mut self, counter: u64) {
        self.node_id_counter = counter;
    }

    /// Raise the counter past every `node_<n>` currently in the graph.
    ///
    /// Called whenever nodes arrive from outside the counter (load, bulk
    /// replace, renderer adds, undo after a clear). Returns the previous
    /// value if the counter had to move.
    pub(crate) fn reserve_existing_ids(&mut self) -> Option<u64> {
        let next_free = self
            .nodes
            .iter()
            .filter_map(|node| node.id.counter_value())
            .max()?
            .saturating_add(1);
        if next_free <= self.node_id_counter {
            return None;
        }
        let previous = self.node_id_counter;
        self.node_id_counter = next_free;
        Some(previous)
    }

    /// Take the next `node_<n>` identifier, returning it with its number.
    pub(crate) fn allocate_node_id(&mut self) -> (NodeId, u64) {
        let n = self.node_id_counter;
        self.node_id_counter += 1;
        (NodeId::from_counter(n), n)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| &edge.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Install new collections.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = Arc::new(nodes);
        self.edges = Arc::new(edges);
    }

    /// Install a new node collection, keeping the current edges.
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = Arc::new(nodes);
    }

    /// Install a new edge collection, keeping the current nodes.
    pub fn replace_edges(&mut self, edges: Vec<Edge>) {
        self.edges = Arc::new(edges);
    }

    /// Capture the current graph.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: Arc::clone(&self.nodes),
            edges: Arc::clone(&self.edges),
        }
    }

    /// Make `snapshot` the current graph. The counter is left alone.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
    }

    /// Compute the graph with the given nodes and edges removed.
    ///
    /// Edges incident to a removed node go too, via [`connected_edges`].
    /// Returns `None` when nothing would be removed.
    pub(crate) fn without(
        &self,
        node_ids: &HashSet<NodeId>,
        edge_ids: &HashSet<EdgeId>,
    ) -> Option<(Vec<Node>, Vec<Edge>)> {
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|node| !node_ids.contains(&node.id))
            .cloned()
            .collect();
        let edges = connected_edges(
            &nodes,
            self.edges
                .iter()
                .filter(|edge| !edge_ids.contains(&edge.id))
                .cloned()
                .collect(),
        );

        if nodes.len() == self.nodes.len() && edges.len() == self.edges.len() {
            None
        } else {
            Some((nodes, edges))
        }
    }

    /// Check whether any edge references a node that does not exist.
    pub fn has_dangling_edges(&self) -> bool {
        let ids: HashSet<&NodeId> = self.nodes.iter().map(|node| &node.id).collect();
        self.edges
            .iter()
            .any(|edge| !ids.contains(&edge.source) || !ids.contains(&edge.target))
    }
}

/// Keep only the edges whose endpoints both exist in `nodes`.
///
/// Every path that removes or replaces nodes runs its edges through here,
/// so no edge is ever left dangling.
pub(crate) fn connected_edges(nodes: &[Node], edges: Vec<Edge>) -> Vec<Edge> {
    let ids: HashSet<&NodeId> = nodes.iter().map(|node| &node.id).collect();
    edges
        .into_iter()
        .filter(|edge| ids.contains(&edge.source) && ids.contains(&edge.target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeData, ShapeKind};
    use kurbo::Point;

    fn node(n: u64) -> Node {
        Node::new(
            NodeId::from_counter(n),
            ShapeKind::Rectangle,
            Point::new(n as f64 * 10.0, 0.0),
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
    fn test_new_store_is_empty() {
        let store = GraphStore::new();
        assert!(store.is_empty());
        assert_eq!(store.node_id_counter(), 1);
    }

    #[test]
    fn test_allocate_is_monotonic() {
        let mut store = GraphStore::new();
        let (a, na) = store.allocate_node_id();
        let (b, nb) = store.allocate_node_id();
        assert_eq!(a.as_str(), "node_1");
        assert_eq!(b.as_str(), "node_2");
        assert!(nb > na);
        assert_eq!(store.node_id_counter(), 3);
    }

    #[test]
    fn test_reserve_existing_ids() {
        let mut store = GraphStore::new();
        assert_eq!(store.reserve_existing_ids(), None);

        let custom = Node::new(
            NodeId::from("imported"),
            ShapeKind::Circle,
            Point::ORIGIN,
            NodeData::default(),
        );
        store.replace(vec![node(4), custom, node(2)], vec![]);

        assert_eq!(store.reserve_existing_ids(), Some(1));
        assert_eq!(store.node_id_counter(), 5);
        assert_eq!(store.reserve_existing_ids(), None);

        store.set_node_id_counter(9);
        assert_eq!(store.reserve_existing_ids(), None);
        assert_eq!(store.node_id_counter(), 9);
    }

    #[test]
    fn test_snapshot_unaffected_by_replace() {
        let mut store = GraphStore::new();
        store.replace(vec![node(1)], vec![]);
        let before = store.snapshot();

        store.replace(vec![node(1), node(2)], vec![edge("e", 1, 2)]);

        assert_eq!(before.nodes().len(), 1);
        assert!(before.edges().is_empty());
        assert_eq!(store.nodes().len(), 2);
    }

    #[test]
    fn test_restore_keeps_counter() {
        let mut store = GraphStore::new();
        let empty = store.snapshot();
        store.allocate_node_id();
        store.replace(vec![node(1)], vec![]);

        store.restore(empty);

        assert!(store.is_empty());
        assert_eq!(store.node_id_counter(), 2);
    }

    #[test]
    fn test_without_cascades_edges() {
        let mut store = GraphStore::new();
        store.replace(
            vec![node(1), node(2), node(3)],
            vec![edge("a", 1, 2), edge("b", 2, 3), edge("c", 1, 3)],
        );

        let removed_nodes = HashSet::from([NodeId::from_counter(2)]);
        let (nodes, edges) = store.without(&removed_nodes, &HashSet::new()).unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id.as_str(), "c");
    }

    #[test]
    fn test_without_reports_nothing_removed() {
        let mut store = GraphStore::new();
        store.replace(vec![node(1)], vec![]);
        let missing = HashSet::from([NodeId::from_counter(9)]);
        assert!(store.without(&missing, &HashSet::new()).is_none());
    }

    #[test]
    fn test_connected_edges_drops_dangling() {
        let nodes = vec![node(1), node(2)];
        let edges = connected_edges(&nodes, vec![edge("ok", 1, 2), edge("bad", 1, 7)]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id.as_str(), "ok");
    }
}
