use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ObjectMetadata, ObjectStore, StorageError};

/// A stored object as seen by [`InMemoryStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub metadata: ObjectMetadata,
}

/// Process-local object store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: DashMap<String, StoredObject>,
    puts: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of distinct objects held
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of `put` calls received, including overwrites
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.insert(key.to_string(), StoredObject { body, metadata });
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
