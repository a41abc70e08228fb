//! FlowSketch Core Library
//!
//! The diagram state engine behind the FlowSketch editor: a node/edge graph,
//! the editing operations that transform it, linear undo/redo over graph
//! snapshots, a copy/paste clipboard and JSON persistence.
//!
//! Rendering, input handling and the toolbar live elsewhere and drive the
//! engine through [`Diagram`].

pub mod arrange;
pub mod changes;
pub mod clipboard;
pub mod config;
pub mod diagram;
pub mod document;
pub mod edge;
pub mod error;
pub mod graph;
pub mod history;
pub mod node;
pub mod storage;

pub use arrange::Alignment;
pub use changes::{EdgeChange, NodeChange};
pub use clipboard::{Clipboard, PastedSubgraph};
pub use config::{EditorConfig, Padding};
pub use diagram::Diagram;
pub use document::DiagramFile;
pub use edge::{Connection, Edge, EdgeId};
pub use error::{DiagramError, DiagramResult};
pub use graph::{GraphStore, Snapshot};
pub use history::History;
pub use node::{Node, NodeData, NodeId, ShapeKind, Style};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
