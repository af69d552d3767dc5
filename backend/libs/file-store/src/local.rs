//! Local-disk backend for the public storage tier

use crate::{FileStore, FileStoreError};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// File store writing under a local public root directory
///
/// Stored names are random (`<uuid>.<ext>`) so repeated uploads of the
/// same client file name never collide or overwrite each other.
#[derive(Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ensure the public root exists. Called once at bootstrap.
    pub async fn init(&self) -> Result<(), FileStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tracing::info!(root = %self.root.display(), "public file store initialized");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative stored path against the root, rejecting
    /// anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, FileStoreError> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return Err(FileStoreError::InvalidPath(path.to_string()));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(FileStoreError::InvalidPath(path.to_string())),
            }
        }
        Ok(self.root.join(relative))
    }
}

fn valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extension carried over from the client file name, lowercased.
/// Anything that does not look like a plain extension is dropped.
fn extension_of(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        namespace: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<String, FileStoreError> {
        if !valid_namespace(namespace) {
            return Err(FileStoreError::InvalidNamespace(namespace.to_string()));
        }

        let stored_name = match extension_of(file_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let relative = format!("{}/{}", namespace, stored_name);

        let dir = self.root.join(namespace);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&stored_name), data).await?;

        tracing::debug!(path = %relative, bytes = data.len(), "stored file");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<bool, FileStoreError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path = %path, "deleted stored file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, FileStoreError> {
        let full = self.resolve(path)?;
        match tokio::fs::metadata(&full).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> LocalFileStore {
        LocalFileStore::new(dir.path(), "http://localhost:8080/storage")
    }

    #[tokio::test]
    async fn store_writes_under_namespace_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let path = store.store("categories", "logo.PNG", b"data").await.unwrap();

        assert!(path.starts_with("categories/"));
        assert!(path.ends_with(".png"));
        assert_eq!(
            tokio::fs::read(dir.path().join(&path)).await.unwrap(),
            b"data"
        );
    }

    #[tokio::test]
    async fn store_generates_distinct_paths_for_same_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = store.store("posts", "image.jpg", b"a").await.unwrap();
        let second = store.store("posts", "image.jpg", b"b").await.unwrap();

        assert_ne!(first, second);
        assert!(store.exists(&first).await.unwrap());
        assert!(store.exists(&second).await.unwrap());
    }

    #[tokio::test]
    async fn store_drops_suspicious_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let path = store.store("posts", "no-extension", b"x").await.unwrap();
        assert!(!path.contains('.'));

        let path = store.store("posts", "weird.p/ng", b"x").await.unwrap();
        assert!(!path.ends_with("p/ng"));
    }

    #[tokio::test]
    async fn store_rejects_bad_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store.store("../etc", "a.png", b"x").await.unwrap_err();
        assert!(matches!(err, FileStoreError::InvalidNamespace(_)));
    }

    #[tokio::test]
    async fn delete_returns_false_for_unknown_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(!store.delete("categories/missing.png").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let path = store.store("categories", "a.gif", b"x").await.unwrap();
        assert!(store.delete(&path).await.unwrap());
        assert!(!store.exists(&path).await.unwrap());
        assert!(!store.delete(&path).await.unwrap());
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.delete("../outside.png").await.is_err());
        assert!(store.delete("/etc/passwd").await.is_err());
        assert!(store.exists("categories/../../x").await.is_err());
    }

    #[tokio::test]
    async fn public_url_joins_base_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path(), "http://cdn.local/storage/");

        assert_eq!(
            store.public_url("categories/a.png"),
            "http://cdn.local/storage/categories/a.png"
        );
    }
}
