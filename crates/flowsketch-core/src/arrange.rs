//! Layout operations: grouping, alignment, distribution and rotation.

use crate::diagram::Diagram;
use crate::error::DiagramError;
use crate::node::{Node, NodeData, NodeId, ShapeKind};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Which edge or center line [`Diagram::align_nodes`] lines nodes up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl FromStr for Alignment {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            "top" => Ok(Alignment::Top),
            "middle" => Ok(Alignment::Middle),
            "bottom" => Ok(Alignment::Bottom),
            other => Err(DiagramError::UnknownAlignment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn of(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    fn set(self, point: &mut Point, value: f64) {
        match self {
            Axis::Horizontal => point.x = value,
            Axis::Vertical => point.y = value,
        }
    }
}

/// Normalize an angle in degrees into [0, 360).
fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if normalized >= 360.0 { 0.0 } else { normalized }
}

impl Diagram {
    /// Current state of each listed node that still exists, in list order.
    fn live_nodes(&self, ids: &[NodeId]) -> Vec<&Node> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.graph.node(id))
            .collect()
    }

    /// Commit new positions for some nodes. Nodes not in `positions` are kept.
    fn commit_positions(&mut self, positions: &HashMap<NodeId, Point>) {
        let ids: HashSet<&NodeId> = positions.keys().collect();
        if let Some(nodes) = self.map_nodes(&ids, |node| {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }) {
            self.commit_nodes(nodes);
        }
    }

    /// Add a group node framing the given nodes.
    ///
    /// The group sits behind everything else (`z_index` -1) and does not
    /// own its members; it is purely visual. Needs at least two nodes.
    pub fn create_group(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        let members = self.live_nodes(ids);
        if members.len() < 2 {
            return None;
        }

        let fallback = self.config.group_member_fallback_size;
        let bounds = members
            .iter()
            .map(|node| Rect::from_origin_size(node.position, node.size_or(fallback)))
            .reduce(|a, b| a.union(b))?;
        let frame = self.config.group_padding.around(bounds);
        let member_count = members.len();

        let (id, n) = self.graph.allocate_node_id();
        let mut data = NodeData::labeled(format!("Group {n}"));
        data.width = Some(frame.width());
        data.height = Some(frame.height());
        let mut group = Node::new(id.clone(), ShapeKind::Group, frame.origin(), data);
        group.z_index = Some(-1);

        let mut nodes = self.graph.nodes().to_vec();
        nodes.push(group);
        self.commit_nodes(nodes);

        log::debug!("grouped {member_count} node(s) into {id}");
        Some(id)
    }

    /// Line up nodes on a shared edge or center line.
    ///
    /// Left and top use the smallest coordinate, right and bottom the
    /// largest far edge. Center and middle use the mean of the node centers
    /// rather than the midpoint of the bounding box. Needs at least two nodes.
    pub fn align_nodes(&mut self, ids: &[NodeId], alignment: Alignment) {
        let targets = self.live_nodes(ids);
        if targets.len() < 2 {
            return;
        }

        let fallback = self.config.align_fallback_size;
        let frames: Vec<(NodeId, Point, Size)> = targets
            .iter()
            .map(|node| (node.id.clone(), node.position, node.size_or(fallback)))
            .collect();
        let count = frames.len() as f64;

        let positions: HashMap<NodeId, Point> = match alignment {
            Alignment::Left => {
                let x = frames.iter().map(|(_, p, _)| p.x).fold(f64::INFINITY, f64::min);
                frames.into_iter().map(|(id, p, _)| (id, Point::new(x, p.y))).collect()
            }
            Alignment::Top => {
                let y = frames.iter().map(|(_, p, _)| p.y).fold(f64::INFINITY, f64::min);
                frames.into_iter().map(|(id, p, _)| (id, Point::new(p.x, y))).collect()
            }
            Alignment::Right => {
                let right = frames
                    .iter()
                    .map(|(_, p, s)| p.x + s.width)
                    .fold(f64::NEG_INFINITY, f64::max);
                frames
                    .into_iter()
                    .map(|(id, p, s)| (id, Point::new(right - s.width, p.y)))
                    .collect()
            }
            Alignment::Bottom => {
                let bottom = frames
                    .iter()
                    .map(|(_, p, s)| p.y + s.height)
                    .fold(f64::NEG_INFINITY, f64::max);
                frames
                    .into_iter()
                    .map(|(id, p, s)| (id, Point::new(p.x, bottom - s.height)))
                    .collect()
            }
            Alignment::Center => {
                let center =
                    frames.iter().map(|(_, p, s)| p.x + s.width / 2.0).sum::<f64>() / count;
                frames
                    .into_iter()
                    .map(|(id, p, s)| (id, Point::new(center - s.width / 2.0, p.y)))
                    .collect()
            }
            Alignment::Middle => {
                let middle =
                    frames.iter().map(|(_, p, s)| p.y + s.height / 2.0).sum::<f64>() / count;
                frames
                    .into_iter()
                    .map(|(id, p, s)| (id, Point::new(p.x, middle - s.height / 2.0)))
                    .collect()
            }
        };

        self.commit_positions(&positions);
        log::debug!("aligned {} node(s) {alignment:?}", positions.len());
    }

    /// Space nodes evenly along x, keeping the leftmost and rightmost in place.
    /// Needs at least three nodes.
    pub fn distribute_nodes_horizontally(&mut self, ids: &[NodeId]) {
        self.distribute(ids, Axis::Horizontal);
    }

    /// Space nodes evenly along y, keeping the topmost and bottommost in place.
    /// Needs at least three nodes.
    pub fn distribute_nodes_vertically(&mut self, ids: &[NodeId]) {
        self.distribute(ids, Axis::Vertical);
    }

    fn distribute(&mut self, ids: &[NodeId], axis: Axis) {
        let mut targets: Vec<(NodeId, Point)> = self
            .live_nodes(ids)
            .into_iter()
            .map(|node| (node.id.clone(), node.position))
            .collect();
        if targets.len() < 3 {
            return;
        }

        targets.sort_by(|a, b| axis.of(a.1).total_cmp(&axis.of(b.1)));
        let first = axis.of(targets[0].1);
        let last = axis.of(targets[targets.len() - 1].1);
        let spacing = (last - first) / (targets.len() - 1) as f64;

        let interior = &targets[1..targets.len() - 1];
        let positions: HashMap<NodeId, Point> = interior
            .iter()
            .enumerate()
            .map(|(i, (id, position))| {
                let mut position = *position;
                axis.set(&mut position, first + spacing * (i + 1) as f64);
                (id.clone(), position)
            })
            .collect();

        self.commit_positions(&positions);
        log::debug!("distributed {} node(s) {axis:?}", targets.len());
    }

    /// Rotate one node by `delta` degrees.
    ///
    /// Rotation handles report many small deltas while dragging, so deltas
    /// below the configured threshold are committed without an undo step.
    pub fn rotate_node(&mut self, id: &NodeId, delta: f64) -> bool {
        let ids = HashSet::from([id]);
        let Some(nodes) = self.map_nodes(&ids, |node| {
            node.set_rotation(normalize_degrees(node.rotation() + delta));
        }) else {
            return false;
        };

        if delta.abs() >= self.config.rotation_checkpoint_threshold {
            self.commit_nodes(nodes);
            log::debug!("rotated node {id} by {delta}deg");
        } else {
            self.graph.replace_nodes(nodes);
            log::trace!("rotated node {id} by {delta}deg without checkpoint");
        }
        true
    }

    /// Rotate several nodes by `delta` degrees as one undo step.
    pub fn rotate_nodes(&mut self, ids: &[NodeId], delta: f64) -> bool {
        let ids: HashSet<&NodeId> = ids.iter().collect();
        let Some(nodes) = self.map_nodes(&ids, |node| {
            node.set_rotation(normalize_degrees(node.rotation() + delta));
        }) else {
            return false;
        };
        self.commit_nodes(nodes);
        log::debug!("rotated {} node(s) by {delta}deg", ids.len());
        true
    }
}
