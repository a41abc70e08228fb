//! The diagram state container and its editing operations.
//!
//! [`Diagram`] owns the graph store, the undo history and the clipboard.
//! Every mutating operation follows the same shape: check its inputs,
//! build the new collections from the current ones, checkpoint, commit.
//! Inputs that leave nothing to do are silent no-ops and leave history
//! untouched.
//!
//! Arrangement operations (group, align, distribute, rotate) live in
//! [`crate::arrange`], and the renderer's change-list entry points in
//! [`crate::changes`].

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::document::DiagramFile;
use crate::edge::{Connection, Edge, EdgeId};
use crate::error::DiagramResult;
use crate::graph::{GraphStore, Snapshot, connected_edges};
use crate::history::History;
use crate::node::{BACKGROUND_COLOR, Node, NodeData, NodeId, ShapeKind, Style};
use kurbo::{Point, Size};
use std::collections::HashSet;

/// An editable diagram.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub(crate) graph: GraphStore,
    pub(crate) history: History,
    clipboard: Clipboard,
    pub(crate) config: EditorConfig,
    /// Graph as it was when the current node drag started.
    pub(crate) drag_origin: Option<Snapshot>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// Create an empty diagram with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an empty diagram with the given configuration.
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            graph: GraphStore::new(),
            history: History::with_limit(config.history_limit),
            clipboard: Clipboard::new(),
            config,
            drag_origin: None,
        }
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.graph.edge(id)
    }

    pub fn node_id_counter(&self) -> u64 {
        self.graph.node_id_counter()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    // --- History ---------------------------------------------------------

    /// Push the current graph onto the undo stack and drop the redo branch.
    pub fn checkpoint(&mut self) {
        let snapshot = self.graph.snapshot();
        self.push_checkpoint(snapshot);
    }

    pub(crate) fn push_checkpoint(&mut self, snapshot: Snapshot) {
        self.drag_origin = None;
        self.history.checkpoint(snapshot);
        log::debug!("checkpoint (undo depth {})", self.history.undo_depth());
    }

    /// Undo the last change. Returns false if there was nothing to undo.
    ///
    /// The node ID counter is not rolled back.
    pub fn undo(&mut self) -> bool {
        let current = self.graph.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.drag_origin = None;
                self.graph.restore(previous);
                self.reserve_existing_ids();
                log::debug!("undo (undo depth {})", self.history.undo_depth());
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = self.graph.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.drag_origin = None;
                self.graph.restore(next);
                self.reserve_existing_ids();
                log::debug!("redo (redo depth {})", self.history.redo_depth());
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Keep the counter ahead of every `node_<n>` in the graph so that
    /// the next allocated ID is free.
    pub(crate) fn reserve_existing_ids(&mut self) {
        if let Some(previous) = self.graph.reserve_existing_ids() {
            log::debug!(
                "raised node counter from {previous} to {}",
                self.graph.node_id_counter()
            );
        }
    }

    /// Checkpoint, then install new nodes.
    pub(crate) fn commit_nodes(&mut self, nodes: Vec<Node>) {
        self.checkpoint();
        self.graph.replace_nodes(nodes);
    }

    /// Checkpoint, then install new edges.
    pub(crate) fn commit_edges(&mut self, edges: Vec<Edge>) {
        self.checkpoint();
        self.graph.replace_edges(edges);
    }

    /// Checkpoint, then install a whole new graph.
    pub(crate) fn commit(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.checkpoint();
        self.graph.replace(nodes, edges);
    }

    /// Copy of the current nodes with `edit` applied to those in `ids`.
    /// Returns `None` if no node matched.
    pub(crate) fn map_nodes(
        &self,
        ids: &HashSet<&NodeId>,
        mut edit: impl FnMut(&mut Node),
    ) -> Option<Vec<Node>> {
        let mut touched = false;
        let nodes = self
            .graph
            .nodes()
            .iter()
            .map(|node| {
                let mut node = node.clone();
                if ids.contains(&node.id) {
                    edit(&mut node);
                    touched = true;
                }
                node
            })
            .collect();
        touched.then_some(nodes)
    }

    // --- Nodes -----------------------------------------------------------

    /// Add a node of `kind` at `position` and return its ID.
    ///
    /// The label is `"<kind> <n>"`; group nodes get the configured default size.
    pub fn add_node(&mut self, kind: ShapeKind, position: Point) -> NodeId {
        let (id, n) = self.graph.allocate_node_id();
        let mut data = NodeData::labeled(format!("{kind} {n}"));
        if kind.is_group() {
            data.width = Some(self.config.group_default_size.width);
            data.height = Some(self.config.group_default_size.height);
        }

        let mut nodes = self.graph.nodes().to_vec();
        nodes.push(Node::new(id.clone(), kind, position, data));
        self.commit_nodes(nodes);

        log::debug!("added node {id}");
        id
    }

    /// Replace a node's data wholesale.
    ///
    /// This is not a merge: start from a clone of the current data to change
    /// a single field. Returns false if the node does not exist.
    pub fn update_node_data(&mut self, id: &NodeId, data: NodeData) -> bool {
        let ids = HashSet::from([id]);
        let Some(nodes) = self.map_nodes(&ids, |node| node.data = data.clone()) else {
            return false;
        };
        self.commit_nodes(nodes);
        log::debug!("updated data of node {id}");
        true
    }

    /// Resize a group node.
    ///
    /// Resizing arrives as a stream of drag frames, so this commits without
    /// a checkpoint.
    pub fn resize_group_node(&mut self, id: &NodeId, size: Size) -> bool {
        let ids = HashSet::from([id]);
        let Some(nodes) = self.map_nodes(&ids, |node| {
            node.data.width = Some(size.width);
            node.data.height = Some(size.height);
        }) else {
            return false;
        };
        self.graph.replace_nodes(nodes);
        log::trace!("resized node {id} to {}x{} without checkpoint", size.width, size.height);
        true
    }

    /// Delete nodes and edges.
    ///
    /// Edges attached to a deleted node are deleted as well.
    /// Returns false if nothing was removed.
    pub fn delete_elements(&mut self, node_ids: &[NodeId], edge_ids: &[EdgeId]) -> bool {
        if node_ids.is_empty() && edge_ids.is_empty() {
            return false;
        }
        let node_ids: HashSet<NodeId> = node_ids.iter().cloned().collect();
        let edge_ids: HashSet<EdgeId> = edge_ids.iter().cloned().collect();

        let Some((nodes, edges)) = self.graph.without(&node_ids, &edge_ids) else {
            return false;
        };
        let removed = (
            self.graph.nodes().len() - nodes.len(),
            self.graph.edges().len() - edges.len(),
        );
        self.commit(nodes, edges);
        log::debug!("deleted {} node(s) and {} edge(s)", removed.0, removed.1);
        true
    }

    /// Duplicate nodes with fresh sequential IDs, offset by the configured
    /// duplicate offset. Incident edges are not duplicated.
    pub fn duplicate_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let originals: Vec<Node> = ids
            .iter()
            .filter_map(|id| self.graph.node(id))
            .cloned()
            .collect();
        if originals.is_empty() {
            return Vec::new();
        }

        let mut nodes = self.graph.nodes().to_vec();
        let mut created = Vec::with_capacity(originals.len());
        for original in originals {
            let (id, _) = self.graph.allocate_node_id();
            let mut copy = original;
            copy.id = id.clone();
            copy.position += self.config.duplicate_offset;
            nodes.push(copy);
            created.push(id);
        }
        self.commit_nodes(nodes);

        log::debug!("duplicated {} node(s)", created.len());
        created
    }

    /// Apply a fill color to nodes: sets `data.color` and the wrapper's
    /// `backgroundColor`.
    pub fn apply_color_to_selected_nodes(&mut self, ids: &[NodeId], color: &str) -> bool {
        if ids.is_empty() {
            return false;
        }
        let ids: HashSet<&NodeId> = ids.iter().collect();
        let Some(nodes) = self.map_nodes(&ids, |node| {
            node.data.color = Some(color.to_string());
            node.style_mut().set(BACKGROUND_COLOR, color);
        }) else {
            return false;
        };
        self.commit_nodes(nodes);
        log::debug!("applied color {color} to {} node(s)", ids.len());
        true
    }

    /// Replace the node collection.
    ///
    /// Edges left without an endpoint are dropped along with it, and the
    /// counter moves past any `node_<n>` the new nodes use.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        let edges = connected_edges(&nodes, self.graph.edges().to_vec());
        self.commit(nodes, edges);
        self.reserve_existing_ids();
    }

    /// Replace the edge collection. Edges naming missing nodes are dropped.
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        let total = edges.len();
        let edges = connected_edges(self.graph.nodes(), edges);
        if edges.len() < total {
            log::warn!("dropped {} edge(s) with missing endpoints", total - edges.len());
        }
        self.commit_edges(edges);
    }

    /// Remove everything and reset the ID counter.
    ///
    /// Only checkpoints when there was something to clear.
    pub fn clear_canvas(&mut self) {
        if !self.graph.is_empty() {
            self.checkpoint();
        }
        self.graph.replace(Vec::new(), Vec::new());
        self.graph.set_node_id_counter(1);
        log::debug!("cleared canvas");
    }

    // --- Edges -----------------------------------------------------------

    /// Add the edge for a drawn connection.
    ///
    /// Both endpoints must exist and the same connection must not already be
    /// present; otherwise nothing happens.
    pub fn on_connect(&mut self, connection: Connection) -> Option<EdgeId> {
        if !self.graph.contains_node(&connection.source)
            || !self.graph.contains_node(&connection.target)
        {
            log::warn!(
                "ignoring connection {} -> {}: missing endpoint",
                connection.source,
                connection.target
            );
            return None;
        }
        if self.graph.edges().iter().any(|edge| edge.joins(&connection)) {
            return None;
        }

        let style = Style::new().with("stroke", self.config.edge_stroke.clone());
        let mut edge = Edge::from_connection(&connection, style);
        if self.graph.contains_edge(&edge.id) {
            edge.id = fresh_edge_id(&self.graph, &mut HashSet::new());
        }
        let id = edge.id.clone();

        let mut edges = self.graph.edges().to_vec();
        edges.push(edge);
        self.commit_edges(edges);

        log::debug!("connected {} -> {} as {id}", connection.source, connection.target);
        Some(id)
    }

    /// Merge a partial style onto an edge. A `null` value removes the key.
    pub fn update_edge_style(&mut self, id: &EdgeId, partial: &Style) -> bool {
        if !self.graph.contains_edge(id) {
            return false;
        }
        let edges = self
            .graph
            .edges()
            .iter()
            .map(|edge| {
                let mut edge = edge.clone();
                if &edge.id == id {
                    edge.merge_style(partial);
                }
                edge
            })
            .collect();
        self.commit_edges(edges);
        log::debug!("updated style of edge {id}");
        true
    }

    // --- Clipboard -------------------------------------------------------

    /// Copy nodes, and the selected edges running between them, to the clipboard.
    ///
    /// The first listed node becomes the paste anchor. Does not touch history.
    pub fn copy_selection(&mut self, node_ids: &[NodeId], edge_ids: &[EdgeId]) {
        let nodes: Vec<Node> = node_ids
            .iter()
            .filter_map(|id| self.graph.node(id))
            .cloned()
            .collect();
        let edges: Vec<Edge> = edge_ids
            .iter()
            .filter_map(|id| self.graph.edge(id))
            .cloned()
            .collect();
        self.clipboard.copy(&nodes, &edges);
        log::debug!(
            "copied {} node(s) and {} edge(s)",
            self.clipboard.nodes().len(),
            self.clipboard.edges().len()
        );
    }

    /// Paste the clipboard so that its anchor node lands on `at`.
    ///
    /// Returns the new node IDs; empty if the clipboard is empty.
    pub fn paste_selection(&mut self, at: Point) -> Vec<NodeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let first = self.graph.node_id_counter();
        let graph = &self.graph;
        let mut issued = HashSet::new();
        let Some(pasted) = self
            .clipboard
            .instantiate(at, first, || fresh_edge_id(graph, &mut issued))
        else {
            return Vec::new();
        };

        let ids: Vec<NodeId> = pasted.nodes.iter().map(|node| node.id.clone()).collect();
        let edge_count = pasted.edges.len();
        let mut nodes = self.graph.nodes().to_vec();
        nodes.extend(pasted.nodes);
        let mut edges = self.graph.edges().to_vec();
        edges.extend(pasted.edges);

        self.graph.set_node_id_counter(first + ids.len() as u64);
        self.commit(nodes, edges);

        log::debug!("pasted {} node(s) and {edge_count} edge(s)", ids.len());
        ids
    }

    // --- Persistence -----------------------------------------------------

    /// The persisted form of the current graph.
    pub fn to_file(&self) -> DiagramFile {
        DiagramFile {
            nodes: self.graph.nodes().to_vec(),
            edges: self.graph.edges().to_vec(),
            node_id_counter: self.graph.node_id_counter(),
        }
    }

    /// Serialize the current graph to pretty JSON.
    pub fn to_json(&self) -> DiagramResult<String> {
        self.to_file().to_json()
    }

    /// Replace the whole graph and counter from a saved diagram, as one
    /// undoable step.
    ///
    /// Edges with a missing endpoint are dropped, and the counter is raised
    /// past every `node_<n>` already present.
    pub fn load_file(&mut self, file: DiagramFile) {
        let DiagramFile {
            nodes,
            edges,
            node_id_counter,
        } = file;

        let total = edges.len();
        let edges = connected_edges(&nodes, edges);
        if edges.len() < total {
            log::warn!(
                "dropped {} edge(s) with missing endpoints while loading",
                total - edges.len()
            );
        }

        log::info!("loaded diagram with {} node(s) and {} edge(s)", nodes.len(), edges.len());
        self.commit(nodes, edges);
        self.graph.set_node_id_counter(node_id_counter);
        if let Some(previous) = self.graph.reserve_existing_ids() {
            log::warn!(
                "raising node counter from {previous} to {}",
                self.graph.node_id_counter()
            );
        }
    }

    /// Parse and load a saved diagram.
    ///
    /// On error the diagram is left untouched.
    pub fn load_json(&mut self, json: &str) -> DiagramResult<()> {
        let file = DiagramFile::from_json(json)?;
        self.load_file(file);
        Ok(())
    }
}

/// An edge ID not used in `graph` and not yet handed out in `issued`.
fn fresh_edge_id(graph: &GraphStore, issued: &mut HashSet<EdgeId>) -> EdgeId {
    loop {
        let id = EdgeId::generate();
        if !graph.contains_edge(&id) && issued.insert(id.clone()) {
            return id;
        }
    }
}
