//! Engine tunables.

use crate::error::DiagramResult;
use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default stroke color for drawn connections.
pub const DEFAULT_EDGE_STROKE: &str = "#555";

/// Rotation deltas smaller than this (in degrees) are treated as drag
/// frames and do not create an undo step.
pub const DEFAULT_ROTATION_CHECKPOINT_THRESHOLD: f64 = 5.0;

/// Space added around a bounding box, one value per side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Padding {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Grow `rect` outwards by this padding.
    pub fn around(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x0 - self.left,
            rect.y0 - self.top,
            rect.x1 + self.right,
            rect.y1 + self.bottom,
        )
    }
}

/// Configuration for a [`Diagram`](crate::Diagram).
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo depth; `None` keeps every step.
    pub history_limit: Option<usize>,
    /// Offset applied to duplicated nodes.
    pub duplicate_offset: Vec2,
    pub rotation_checkpoint_threshold: f64,
    /// Padding around a new group's bounding box. The top inset is larger
    /// to leave room for the group header.
    pub group_padding: Padding,
    /// Size given to group nodes created from the palette.
    pub group_default_size: Size,
    /// Size assumed for a grouped node with no known dimensions.
    pub group_member_fallback_size: Size,
    /// Size assumed for an aligned node with no known dimensions.
    pub align_fallback_size: Size,
    pub edge_stroke: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            duplicate_offset: Vec2::new(20.0, 20.0),
            rotation_checkpoint_threshold: DEFAULT_ROTATION_CHECKPOINT_THRESHOLD,
            group_padding: Padding::new(20.0, 40.0, 20.0, 20.0),
            group_default_size: Size::new(300.0, 200.0),
            group_member_fallback_size: Size::new(200.0, 100.0),
            align_fallback_size: Size::new(100.0, 40.0),
            edge_stroke: DEFAULT_EDGE_STROKE.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> DiagramResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EditorConfig::from_json(r##"{ "historyLimit": 10, "edgeStroke": "#000" }"##)
            .unwrap();
        assert_eq!(config.history_limit, Some(10));
        assert_eq!(config.edge_stroke, "#000");
        assert_eq!(config.duplicate_offset, Vec2::new(20.0, 20.0));
        assert_eq!(config.group_member_fallback_size, Size::new(200.0, 100.0));
    }

    #[test]
    fn test_group_padding_uses_side_names() {
        let config = EditorConfig::from_json(
            r#"{ "groupPadding": { "left": 10, "top": 30, "right": 10, "bottom": 10 } }"#,
        )
        .unwrap();
        assert_eq!(config.group_padding, Padding::new(10.0, 30.0, 10.0, 10.0));

        let json = serde_json::to_value(EditorConfig::default()).unwrap();
        assert_eq!(
            json["groupPadding"],
            serde_json::json!({ "left": 20.0, "top": 40.0, "right": 20.0, "bottom": 20.0 })
        );
    }

    #[test]
    fn test_padding_grows_rect() {
        let padded = Padding::new(20.0, 40.0, 20.0, 20.0).around(Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(padded, Rect::new(-20.0, -40.0, 320.0, 220.0));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(EditorConfig::from_json("{ historyLimit: }").is_err());
    }
}
