//! Object storage for uploaded order files.
//!
//! Uploads are written through the [`ObjectStore`] trait so the handler never depends on a
//! concrete backend. Three backends are available, selected by `storage.type` in the config:
//!
//! - [`s3::S3Store`]: AWS S3 or any S3-compatible service (Cloudflare R2, MinIO)
//! - [`filesystem::FilesystemStore`]: a local directory, useful for single-node deployments
//! - [`memory::InMemoryStore`]: process-local map for development and tests
//!
//! The service only ever writes. Reads and deletes are not part of the contract; the in-memory
//! backend exposes inspection helpers for tests only.

pub mod filesystem;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

pub use filesystem::FilesystemStore;
pub use memory::InMemoryStore;
pub use s3::S3Store;

use crate::config::StorageConfig;

/// Content type used when the client does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata attached to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
}

impl ObjectMetadata {
    pub fn new(content_type: Option<&str>) -> Self {
        Self {
            content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to store object '{key}': {message}")]
    Backend { key: String, message: String },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode object metadata: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-addressed blob storage with metadata attachment.
///
/// `put` overwrites any existing object under the same key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<(), StorageError>;

    /// Short backend name for logs
    fn kind(&self) -> &'static str;
}

/// Build the configured backend.
pub async fn from_config(config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config {
        StorageConfig::S3 {
            bucket,
            region,
            endpoint_url,
            force_path_style,
        } => Arc::new(S3Store::new(bucket, region.as_deref(), endpoint_url.as_ref(), *force_path_style).await),
        StorageConfig::Filesystem { root } => Arc::new(FilesystemStore::new(root).await?),
        StorageConfig::Memory => Arc::new(InMemoryStore::new()),
    };

    tracing::info!(backend = store.kind(), "Object storage initialized");
    Ok(store)
}
