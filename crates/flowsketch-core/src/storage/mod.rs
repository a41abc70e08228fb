//! Pluggable persistence for saved diagrams.
//!
//! Backends store [`DiagramFile`] values under string IDs. Operations return
//! boxed futures so the same trait fits both native and browser hosts.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::DiagramFile;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Diagram not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A place to keep saved diagrams.
///
/// Native backends must be `Send + Sync`; the wasm variant drops those
/// bounds since the browser is single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    fn save(&self, id: &str, diagram: &DiagramFile) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a diagram; [`StorageError::NotFound`] if there is none under `id`.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DiagramFile>>;

    /// Delete a diagram. Deleting a missing ID succeeds.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// A place to keep saved diagrams.
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, id: &str, diagram: &DiagramFile) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a diagram; [`StorageError::NotFound`] if there is none under `id`.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DiagramFile>>;

    /// Delete a diagram. Deleting a missing ID succeeds.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Minimal executor for driving storage futures in tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
