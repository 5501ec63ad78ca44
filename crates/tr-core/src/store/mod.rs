//! Key-value storage abstraction and the operations built on it.
//!
//! The backend is an opaque object store addressed by `(collection, key)`.
//! Two collections are used: `tracked_entities` holds entity-to-ticket
//! mappings, `dedup_store` holds bucketed dedup claims. The concrete
//! Falcon-backed implementation lives in `tr-platform`;
//! [`MemoryObjectStore`] backs tests and local development.

mod dedup;
mod mapping;
mod memory;

pub use dedup::DedupStore;
pub use mapping::MappingStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use thiserror::Error;

/// Collection holding entity-to-ticket mapping records.
pub const COLLECTION_TRACKED_ENTITIES: &str = "tracked_entities";

/// Collection holding bucketed dedup claims.
pub const COLLECTION_DEDUP_STORE: &str = "dedup_store";

/// Errors from storage operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The backend has no object at the requested key. Callers treat this
    /// as an ordinary miss, not a failure.
    #[error("object not found")]
    NotFound,

    #[error("object key exceeds maximum length of 1000 characters: {0}")]
    KeyTooLong(usize),

    #[error("unsupported time bucket value: {0} (must be one of: forever, 5 minutes, 30 minutes)")]
    UnsupportedTimeBucket(String),

    /// A fetched or stored record could not be decoded or encoded.
    #[error("{0}")]
    Serialization(String),

    /// Transport-level failure talking to the backend.
    #[error("{0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque get/put object storage over named collections.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches the object at `key`, or [`StoreError::NotFound`] when the
    /// backend has none.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Vec<u8>>;

    /// Writes the object at `key`, overwriting any existing value.
    async fn put(&self, collection: &str, key: &str, body: Vec<u8>) -> StoreResult<()>;
}
