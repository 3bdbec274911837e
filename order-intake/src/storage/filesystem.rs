use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{ObjectMetadata, ObjectStore, StorageError};

const METADATA_SUFFIX: &str = ".meta.json";

/// Stores each object as a file directly under `root`, with its metadata in a
/// `<name>.meta.json` sidecar.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    /// Create the store, creating `root` if it does not exist yet.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the object file for `key`.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(file_name_for(key)?))
    }

    pub fn metadata_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(format!("{}{METADATA_SUFFIX}", file_name_for(key)?)))
    }
}

/// Flatten a key into a single path component.
///
/// Client-supplied file names end up in keys, so separators must never reach the filesystem.
fn file_name_for(key: &str) -> Result<String, StorageError> {
    let name: String = key
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::Backend {
            key: key.to_string(),
            message: "key does not map to a valid file name".to_string(),
        });
    }
    Ok(name)
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        let metadata_path = self.metadata_path(key)?;

        tokio::fs::write(&object_path, &body).await?;
        tokio::fs::write(&metadata_path, serde_json::to_vec(&metadata)?).await?;

        tracing::debug!(path = %object_path.display(), bytes = body.len(), "Wrote object to filesystem");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_object_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        store
            .put(
                "2026-10-16T09:30:12.345Z-010-1234-5678-logo.png",
                Bytes::from_static(b"png-bytes"),
                ObjectMetadata::new(Some("image/png")),
            )
            .await
            .unwrap();

        let object = dir.path().join("2026-10-16T09:30:12.345Z-010-1234-5678-logo.png");
        assert_eq!(std::fs::read(&object).unwrap(), b"png-bytes");

        let sidecar = dir.path().join("2026-10-16T09:30:12.345Z-010-1234-5678-logo.png.meta.json");
        let metadata: ObjectMetadata = serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(metadata.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_separators_in_key_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).await.unwrap();

        store
            .put("ts-contact-../../etc/passwd", Bytes::from_static(b"x"), ObjectMetadata::new(None))
            .await
            .unwrap();

        let path = store.object_path("ts-contact-../../etc/passwd").unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("orders");
        let store = FilesystemStore::new(&root).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_dot_keys_rejected() {
        assert!(file_name_for("..").is_err());
        assert!(file_name_for("").is_err());
        assert_eq!(file_name_for("a/b").unwrap(), "a_b");
    }
}
