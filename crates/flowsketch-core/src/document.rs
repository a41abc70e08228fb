//! The persisted diagram format.
//!
//! ```json
//! { "nodes": [...], "edges": [...], "nodeIdCounter": 3 }
//! ```
//!
//! There is no schema version. Missing collections default to empty and a
//! missing or zero counter defaults to 1.

use crate::edge::Edge;
use crate::error::{DiagramError, DiagramResult};
use crate::node::Node;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn first_counter() -> u64 {
    1
}

fn counter_or_first<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let counter = Option::<u64>::deserialize(deserializer)?;
    Ok(counter.filter(|&n| n > 0).unwrap_or_else(first_counter))
}

/// A saved diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramFile {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default = "first_counter", deserialize_with = "counter_or_first")]
    pub node_id_counter: u64,
}

impl Default for DiagramFile {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_id_counter: first_counter(),
        }
    }
}

impl DiagramFile {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a saved diagram.
    ///
    /// Syntax errors surface as [`DiagramError::Parse`]; well-formed JSON of
    /// the wrong shape as [`DiagramError::InvalidDocument`].
    pub fn from_json(json: &str) -> DiagramResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Some(root) = value.as_object() else {
            return Err(DiagramError::InvalidDocument(
                "expected a JSON object at the top level".to_string(),
            ));
        };
        for key in ["nodes", "edges"] {
            if let Some(field) = root.get(key) {
                if !field.is_array() && !field.is_null() {
                    return Err(DiagramError::InvalidDocument(format!(
                        "`{key}` must be an array"
                    )));
                }
            }
        }

        let mut root = root.clone();
        root.retain(|_, field| !field.is_null());
        Ok(serde_json::from_value(Value::Object(root))?)
    }
}
