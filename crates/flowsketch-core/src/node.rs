//! Diagram nodes: shape kinds, per-node data and CSS-like style bags.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Style key holding a node's fill color.
pub const BACKGROUND_COLOR: &str = "backgroundColor";
/// Style key holding a node's CSS transform.
pub const TRANSFORM: &str = "transform";

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

fn origin() -> Point {
    Point::ORIGIN
}

/// Unique identifier for nodes.
///
/// Nodes created by the engine are named `node_<n>`, where `n` comes from
/// the document's monotonic counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an arbitrary identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier for counter value `n`.
    pub fn from_counter(n: u64) -> Self {
        Self(format!("node_{n}"))
    }

    /// Numeric suffix of a `node_<n>` identifier.
    pub fn counter_value(&self) -> Option<u64> {
        self.0.strip_prefix("node_")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The rendering kind of a node.
///
/// The engine treats every kind the same except [`ShapeKind::Group`].
/// Kinds it does not know about are carried verbatim in [`ShapeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Stadium,
    Diamond,
    Io,
    Terminator,
    Group,
    Hexagon,
    Start,
    Process,
    Decision,
    Other(String),
}

impl ShapeKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Stadium => "stadium",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Io => "io",
            ShapeKind::Terminator => "terminator",
            ShapeKind::Group => "group",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Start => "start",
            ShapeKind::Process => "process",
            ShapeKind::Decision => "decision",
            ShapeKind::Other(name) => name,
        }
    }

    /// Check if this is the group kind.
    pub fn is_group(&self) -> bool {
        matches!(self, ShapeKind::Group)
    }
}

impl From<&str> for ShapeKind {
    fn from(name: &str) -> Self {
        match name {
            "rectangle" => ShapeKind::Rectangle,
            "circle" => ShapeKind::Circle,
            "stadium" => ShapeKind::Stadium,
            "diamond" => ShapeKind::Diamond,
            "io" => ShapeKind::Io,
            "terminator" => ShapeKind::Terminator,
            "group" => ShapeKind::Group,
            "hexagon" => ShapeKind::Hexagon,
            "start" => ShapeKind::Start,
            "process" => ShapeKind::Process,
            "decision" => ShapeKind::Decision,
            other => ShapeKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ShapeKind {
    fn from(name: String) -> Self {
        ShapeKind::from(name.as_str())
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CSS-like property bag (`backgroundColor`, `transform`, `stroke`, ...).
///
/// Values are kept as raw JSON so that whatever the presentation layer
/// writes survives a save/load round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(BTreeMap<String, Value>);

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a property as a string, if it is one.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge a partial style on top of this one.
    ///
    /// Each key of `partial` overwrites the existing value; a `null` value
    /// removes the key instead.
    pub fn merge(&mut self, partial: &Style) {
        for (key, value) in &partial.0 {
            if value.is_null() {
                self.0.remove(key);
            } else {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Editable payload of a node.
///
/// `update_node_data` replaces this wholesale; callers that only want to
/// change one field must start from a clone of the current data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees, normalized to [0, 360).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Fields written by shape components that the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    /// Data carrying only a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// A diagram shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Free-floating canvas coordinates of the top-left corner.
    #[serde(default = "origin")]
    pub position: Point,
    #[serde(default)]
    pub data: NodeData,
    /// Inline style applied by the renderer to the node wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// Measured width reported by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Measured height reported by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl Node {
    /// Create a node with no style, z-index or measured size.
    pub fn new(id: NodeId, kind: ShapeKind, position: Point, data: NodeData) -> Self {
        Self {
            id,
            kind,
            position,
            data,
            style: None,
            z_index: None,
            width: None,
            height: None,
            selected: false,
        }
    }

    /// Effective size: measured size, then the size stored in data, then `fallback`.
    ///
    /// A zero or negative dimension counts as missing; renderers report 0
    /// before a node has been laid out.
    pub fn size_or(&self, fallback: Size) -> Size {
        let positive = |v: &f64| *v > 0.0;
        Size::new(
            self.width
                .filter(positive)
                .or(self.data.width.filter(positive))
                .unwrap_or(fallback.width),
            self.height
                .filter(positive)
                .or(self.data.height.filter(positive))
                .unwrap_or(fallback.height),
        )
    }

    /// Current rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.data.rotation.unwrap_or(0.0)
    }

    /// Set the rotation (degrees) and derive the wrapper's CSS transform from it.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.data.rotation = Some(degrees);
        self.style_mut()
            .set(TRANSFORM, format!("rotate({degrees}deg)"));
    }

    /// Mutable access to the wrapper style, creating it if absent.
    pub fn style_mut(&mut self) -> &mut Style {
        self.style.get_or_insert_with(Style::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_id_counter_value() {
        assert_eq!(NodeId::from_counter(7).as_str(), "node_7");
        assert_eq!(NodeId::from("node_42").counter_value(), Some(42));
        assert_eq!(NodeId::from("custom").counter_value(), None);
        assert_eq!(NodeId::from("node_x").counter_value(), None);
    }

    #[test]
    fn test_shape_kind_wire_names() {
        let kind: ShapeKind = serde_json::from_value(json!("io")).unwrap();
        assert_eq!(kind, ShapeKind::Io);
        assert_eq!(serde_json::to_value(&ShapeKind::Group).unwrap(), json!("group"));

        let custom: ShapeKind = serde_json::from_value(json!("cloud")).unwrap();
        assert_eq!(custom, ShapeKind::Other("cloud".to_string()));
        assert_eq!(serde_json::to_value(&custom).unwrap(), json!("cloud"));
    }

    #[test]
    fn test_style_merge_overwrites_and_removes() {
        let mut style = Style::new()
            .with("stroke", "#555")
            .with("strokeDasharray", "5,5");
        let partial = Style::new()
            .with("stroke", "#f00")
            .with("strokeWidth", 3)
            .with("strokeDasharray", Value::Null);

        style.merge(&partial);

        assert_eq!(style.get_str("stroke"), Some("#f00"));
        assert_eq!(style.get("strokeWidth"), Some(&json!(3)));
        assert!(style.get("strokeDasharray").is_none());
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            json!({ "stroke": "#f00", "strokeWidth": 3 })
        );
    }

    #[test]
    fn test_node_deserialize_minimal() {
        let node: Node = serde_json::from_value(json!({
            "id": "node_3",
            "type": "diamond",
            "position": { "x": 10.0, "y": -5.0 },
            "data": { "label": "Check", "borderColor": "#333" }
        }))
        .unwrap();

        assert_eq!(node.kind, ShapeKind::Diamond);
        assert_eq!(node.position, Point::new(10.0, -5.0));
        assert_eq!(node.data.label, "Check");
        assert_eq!(node.data.extra.get("borderColor"), Some(&json!("#333")));
        assert!(!node.selected);
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let mut node = Node::new(
            NodeId::from_counter(1),
            ShapeKind::Group,
            Point::new(1.0, 2.0),
            NodeData::labeled("Group 1"),
        );
        node.z_index = Some(-1);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], json!("group"));
        assert_eq!(value["zIndex"], json!(-1));
        assert_eq!(value["position"], json!({ "x": 1.0, "y": 2.0 }));
        assert!(value.get("selected").is_none());
    }

    #[test]
    fn test_size_falls_back_in_order() {
        let mut node = Node::new(
            NodeId::from_counter(1),
            ShapeKind::Rectangle,
            Point::ORIGIN,
            NodeData::default(),
        );
        let fallback = Size::new(200.0, 100.0);
        assert_eq!(node.size_or(fallback), fallback);

        node.data.width = Some(300.0);
        node.height = Some(50.0);
        assert_eq!(node.size_or(fallback), Size::new(300.0, 50.0));

        node.width = Some(120.0);
        assert_eq!(node.size_or(fallback), Size::new(120.0, 50.0));
    }

    #[test]
    fn test_zero_size_counts_as_missing() {
        let mut node = Node::new(
            NodeId::from_counter(1),
            ShapeKind::Rectangle,
            Point::ORIGIN,
            NodeData::default(),
        );
        let fallback = Size::new(200.0, 100.0);

        node.width = Some(0.0);
        node.height = Some(0.0);
        assert_eq!(node.size_or(fallback), fallback);

        node.data.width = Some(80.0);
        node.data.height = Some(0.0);
        assert_eq!(node.size_or(fallback), Size::new(80.0, 100.0));
    }

    #[test]
    fn test_set_rotation_derives_transform() {
        let mut node = Node::new(
            NodeId::from_counter(1),
            ShapeKind::Rectangle,
            Point::ORIGIN,
            NodeData::default(),
        );
        node.set_rotation(90.0);
        assert_eq!(node.rotation(), 90.0);
        assert_eq!(
            node.style.as_ref().and_then(|s| s.get_str(TRANSFORM)),
            Some("rotate(90deg)")
        );
    }
}
