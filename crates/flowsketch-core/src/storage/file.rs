//! One JSON file per diagram on the local filesystem.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::DiagramFile;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores diagrams as `<id>.json` files under a base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Storage under the platform data directory, e.g.
    /// `~/.local/share/flowsketch/diagrams` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("flowsketch").join("diagrams"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn diagram_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, diagram: &DiagramFile) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.diagram_path(id);
        let json = diagram
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()));

        Box::pin(async move {
            fs::write(&path, json?).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {e}", path.display()))
            })?;
            log::info!("saved diagram to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DiagramFile>> {
        let path = self.diagram_path(id);
        let id = id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {e}", path.display()))
            })?;
            let diagram = DiagramFile::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {e}", path.display()))
            })?;
            log::info!("loaded diagram from {}", path.display());
            Ok(diagram)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.diagram_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(Vec::new());
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.diagram_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::Diagram;
    use crate::edge::Connection;
    use crate::node::ShapeKind;
    use crate::storage::block_on;
    use kurbo::Point;
    use tempfile::tempdir;

    fn sample() -> DiagramFile {
        let mut diagram = Diagram::new();
        let a = diagram.add_node(ShapeKind::Start, Point::new(0.0, 0.0));
        let b = diagram.add_node(ShapeKind::Decision, Point::new(0.0, 120.0));
        diagram.on_connect(Connection::new(a, b));
        diagram.to_file()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let file = sample();

        block_on(storage.save("flow", &file)).unwrap();
        let loaded = block_on(storage.load("flow")).unwrap();

        assert_eq!(loaded, file);
        assert!(dir.path().join("flow.json").exists());
    }

    #[test]
    fn test_load_into_diagram() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("flow", &sample())).unwrap();

        let mut diagram = Diagram::new();
        diagram.load_file(block_on(storage.load("flow")).unwrap());

        assert_eq!(diagram.nodes().len(), 2);
        assert_eq!(diagram.edges().len(), 1);
        assert_eq!(diagram.node_id_counter(), 3);
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let result = block_on(storage.load("missing"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ nodes: ").unwrap();

        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        block_on(storage.save("two", &sample())).unwrap();
        block_on(storage.save("one", &sample())).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["one", "two"]);

        block_on(storage.delete("one")).unwrap();
        assert!(!block_on(storage.exists("one")).unwrap());
        assert_eq!(block_on(storage.list()).unwrap(), vec!["two"]);
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("team/flow:v2", &sample())).unwrap();

        assert!(dir.path().join("team_flow_v2.json").exists());
        assert!(block_on(storage.load("team/flow:v2")).is_ok());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(nested.clone()).unwrap();
        assert_eq!(storage.base_path(), nested.as_path());
        assert!(nested.is_dir());
    }
}
