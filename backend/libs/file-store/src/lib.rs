//! Public file storage abstraction
//!
//! Provides the storage contract consumed by upload handlers: store a
//! file under a namespace, delete it by path, and resolve the public URL
//! a static file tier serves it from. The default backend writes to a
//! local "public" disk root.

mod local;

pub use local::LocalFileStore;

use async_trait::async_trait;
use std::sync::Arc;

/// Errors produced by file store backends
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    #[error("invalid storage namespace: {0}")]
    InvalidNamespace(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage contract for uploaded files
///
/// Paths returned by `store` are relative (`namespace/<name>.<ext>`) and
/// are what gets persisted on the owning row; `delete` and `exists` take
/// the same relative form.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `data` under `namespace`, returning the stored path.
    ///
    /// The stored name is generated; `file_name` only contributes the
    /// extension.
    async fn store(
        &self,
        namespace: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<String, FileStoreError>;

    /// Remove a stored file. Returns `false` when the path does not
    /// exist, `Err` only on an actual backend fault.
    async fn delete(&self, path: &str) -> Result<bool, FileStoreError>;

    /// Whether a stored path currently resolves to a file.
    async fn exists(&self, path: &str) -> Result<bool, FileStoreError>;

    /// Public URL the file is served from.
    fn public_url(&self, path: &str) -> String;
}

/// Shared handle handlers receive via application data
pub type SharedFileStore = Arc<dyn FileStore>;
