//! Change lists reported by the canvas renderer.
//!
//! The renderer describes what the user did as a list of small changes
//! (a node moved, an edge got selected, ...). [`Diagram::on_nodes_change`]
//! and [`Diagram::on_edges_change`] apply a whole list as one step and
//! decide whether that step deserves an undo entry.
//!
//! Dragging a node produces a stream of `Position` changes flagged
//! `dragging: true`, finished by one without the flag. The first frame
//! remembers the graph as it was before the drag, and the finishing frame
//! checkpoints that state, so one undo puts the node back where the drag
//! started.

use crate::diagram::Diagram;
use crate::edge::{Edge, EdgeId};
use crate::graph::connected_edges;
use crate::node::{Node, NodeId};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of a node change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    Position {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Point>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dragging: Option<bool>,
    },
    Dimensions {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<Size>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resizing: Option<bool>,
    },
    Select {
        id: NodeId,
        selected: bool,
    },
    Remove {
        id: NodeId,
    },
    Add {
        item: Node,
    },
}

impl NodeChange {
    /// Whether applying this change should create an undo step.
    fn is_undoable(&self) -> bool {
        match self {
            NodeChange::Position { dragging, .. } => *dragging != Some(true),
            NodeChange::Remove { .. } | NodeChange::Add { .. } => true,
            NodeChange::Dimensions { .. } | NodeChange::Select { .. } => false,
        }
    }

    fn is_drag_frame(&self) -> bool {
        matches!(
            self,
            NodeChange::Position {
                dragging: Some(true),
                ..
            }
        )
    }
}

/// One entry of an edge change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Select { id: EdgeId, selected: bool },
    Remove { id: EdgeId },
    Add { item: Edge },
}

impl EdgeChange {
    fn is_undoable(&self) -> bool {
        !matches!(self, EdgeChange::Select { .. })
    }
}

impl Diagram {
    /// Apply a node change list from the renderer.
    ///
    /// Removing a node also removes its edges. Adding a node whose ID is
    /// already taken is ignored; an added `node_<n>` moves the counter past `n`.
    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) {
        if changes.is_empty() {
            return;
        }

        if self.drag_origin.is_none() && changes.iter().any(NodeChange::is_drag_frame) {
            self.drag_origin = Some(self.graph.snapshot());
            log::trace!("drag started");
        }

        let mut nodes = self.graph.nodes().to_vec();
        let mut removed = false;
        for change in changes {
            match change {
                NodeChange::Position { id, position, .. } => {
                    if let (Some(node), Some(position)) =
                        (nodes.iter_mut().find(|node| &node.id == id), position)
                    {
                        node.position = *position;
                    }
                }
                NodeChange::Dimensions { id, dimensions, .. } => {
                    if let (Some(node), Some(size)) =
                        (nodes.iter_mut().find(|node| &node.id == id), dimensions)
                    {
                        node.width = Some(size.width);
                        node.height = Some(size.height);
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(node) = nodes.iter_mut().find(|node| &node.id == id) {
                        node.selected = *selected;
                    }
                }
                NodeChange::Remove { id } => {
                    let before = nodes.len();
                    nodes.retain(|node| &node.id != id);
                    removed |= nodes.len() < before;
                }
                NodeChange::Add { item } => {
                    if nodes.iter().any(|node| node.id == item.id) {
                        log::warn!("ignoring added node {}: id already in use", item.id);
                    } else {
                        nodes.push(item.clone());
                    }
                }
            }
        }

        let edges = if removed {
            Some(connected_edges(&nodes, self.graph.edges().to_vec()))
        } else {
            None
        };

        if changes.iter().any(NodeChange::is_undoable) {
            let origin = self
                .drag_origin
                .take()
                .unwrap_or_else(|| self.graph.snapshot());
            self.push_checkpoint(origin);
        } else {
            log::trace!("applied {} node change(s) without checkpoint", changes.len());
        }

        match edges {
            Some(edges) => self.graph.replace(nodes, edges),
            None => self.graph.replace_nodes(nodes),
        }
        self.reserve_existing_ids();
    }

    /// Apply an edge change list from the renderer.
    ///
    /// Added edges must name existing nodes and a free ID; others are ignored.
    pub fn on_edges_change(&mut self, changes: &[EdgeChange]) {
        if changes.is_empty() {
            return;
        }

        let node_ids: HashSet<&NodeId> = self.graph.nodes().iter().map(|node| &node.id).collect();
        let mut edges = self.graph.edges().to_vec();
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = edges.iter_mut().find(|edge| &edge.id == id) {
                        edge.selected = *selected;
                    }
                }
                EdgeChange::Remove { id } => edges.retain(|edge| &edge.id != id),
                EdgeChange::Add { item } => {
                    if !node_ids.contains(&item.source) || !node_ids.contains(&item.target) {
                        log::warn!("ignoring added edge {}: missing endpoint", item.id);
                    } else if edges.iter().any(|edge| edge.id == item.id) {
                        log::warn!("ignoring added edge {}: id already in use", item.id);
                    } else {
                        edges.push(item.clone());
                    }
                }
            }
        }

        if changes.iter().any(EdgeChange::is_undoable) {
            self.checkpoint();
        } else {
            log::trace!("applied {} edge change(s) without checkpoint", changes.len());
        }
        self.graph.replace_edges(edges);
    }
}
