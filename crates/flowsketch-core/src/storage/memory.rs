//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::DiagramFile;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

fn lock_error<T>(e: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

/// Ephemeral storage, mostly for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    diagrams: RwLock<HashMap<String, DiagramFile>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, diagram: &DiagramFile) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let diagram = diagram.clone();
        Box::pin(async move {
            let mut diagrams = self.diagrams.write().map_err(lock_error)?;
            log::debug!("storing diagram {id} in memory");
            diagrams.insert(id, diagram);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DiagramFile>> {
        let id = id.to_string();
        Box::pin(async move {
            let diagrams = self.diagrams.read().map_err(lock_error)?;
            diagrams
                .get(&id)
                .cloned()
                .ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut diagrams = self.diagrams.write().map_err(lock_error)?;
            diagrams.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let diagrams = self.diagrams.read().map_err(lock_error)?;
            let mut ids: Vec<String> = diagrams.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let diagrams = self.diagrams.read().map_err(lock_error)?;
            Ok(diagrams.contains_key(&id))
        })
    }
}
