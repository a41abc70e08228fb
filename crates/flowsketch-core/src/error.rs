//! Error types for the diagram engine.
//!
//! Editing operations never fail; they degrade to no-ops on bad input.
//! Errors only surface at the persistence and configuration boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("Failed to parse diagram JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid diagram document: {0}")]
    InvalidDocument(String),

    #[error("Unknown alignment: {0}")]
    UnknownAlignment(String),
}

pub type DiagramResult<T> = Result<T, DiagramError>;
