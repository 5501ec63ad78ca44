//! In-memory object store for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ObjectStore, StoreError, StoreResult};

/// An [`ObjectStore`] backed by an in-process map.
///
/// Supports fault injection so error paths can be exercised: a scripted
/// failure is returned by the next matching operation and then cleared.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    collections: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
    get_failure: RwLock<Option<String>>,
    put_failure: RwLock<Option<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `get` fail with a backend error.
    pub async fn fail_next_get(&self, message: impl Into<String>) {
        *self.get_failure.write().await = Some(message.into());
    }

    /// Makes the next `put` fail with a backend error.
    pub async fn fail_next_put(&self, message: impl Into<String>) {
        *self.put_failure.write().await = Some(message.into());
    }

    /// Number of objects stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|objects| objects.len())
            .unwrap_or(0)
    }

    /// Returns true when `collection` holds no objects.
    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Vec<u8>> {
        if let Some(message) = self.get_failure.write().await.take() {
            return Err(StoreError::Backend(message));
        }

        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn put(&self, collection: &str, key: &str, body: Vec<u8>) -> StoreResult<()> {
        if let Some(message) = self.put_failure.write().await.take() {
            return Err(StoreError::Backend(message));
        }

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), body);

        Ok(())
    }
}
