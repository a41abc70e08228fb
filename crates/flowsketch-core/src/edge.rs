//! Directed connections between nodes.

use crate::node::{NodeId, Style, is_false};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh `edge_<millis>_<random>` identifier.
    ///
    /// Uniqueness against a particular graph is the caller's job; see
    /// `Diagram::paste_selection`.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let random = Uuid::new_v4().as_u128() as u32;
        Self(format!("edge_{millis}_{random:08x}"))
    }

    /// Deterministic identifier for a drawn connection.
    pub fn for_connection(connection: &Connection) -> Self {
        Self(format!(
            "edge-{}{}-{}{}",
            connection.source,
            connection.source_handle.as_deref().unwrap_or(""),
            connection.target,
            connection.target_handle.as_deref().unwrap_or(""),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EdgeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A connection drawn by the user between two node handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Connect two nodes through their default handles.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Set explicit handle names.
    pub fn with_handles(
        mut self,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }
}

/// A directed edge. Both endpoints must name nodes present in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            source_handle: None,
            target_handle: None,
            style: None,
            label: None,
            animated: false,
            selected: false,
        }
    }

    /// Build the edge for a drawn connection.
    pub fn from_connection(connection: &Connection, style: Style) -> Self {
        Self {
            id: EdgeId::for_connection(connection),
            source: connection.source.clone(),
            target: connection.target.clone(),
            source_handle: connection.source_handle.clone(),
            target_handle: connection.target_handle.clone(),
            style: Some(style),
            label: None,
            animated: false,
            selected: false,
        }
    }

    /// Check if this edge joins the same handles as `connection`.
    pub fn joins(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_handle == connection.source_handle
            && self.target_handle == connection.target_handle
    }

    /// Merge a partial style onto this edge's style.
    pub fn merge_style(&mut self, partial: &Style) {
        self.style.get_or_insert_with(Style::new).merge(partial);
    }
}
