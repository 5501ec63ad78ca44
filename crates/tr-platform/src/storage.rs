//! Custom-storage backend for the [`ObjectStore`] abstraction.

use async_trait::async_trait;
use std::sync::Arc;

use tr_core::store::{ObjectStore, StoreError, StoreResult};

use crate::error::PlatformError;
use crate::http::HttpClient;

/// [`ObjectStore`] over the platform's custom-storage REST surface.
pub struct FalconObjectStore {
    http: Arc<HttpClient>,
}

impl FalconObjectStore {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn object_path(collection: &str, key: &str) -> String {
        format!(
            "/customobjects/v1/collections/{}/objects/{}",
            collection, key
        )
    }
}

#[async_trait]
impl ObjectStore for FalconObjectStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Vec<u8>> {
        match self.http.get_bytes(&Self::object_path(collection, key)).await {
            Ok(body) => Ok(body),
            Err(PlatformError::NotFound(_)) => Err(StoreError::NotFound),
            Err(err) => Err(StoreError::Backend(err.to_string())),
        }
    }

    async fn put(&self, collection: &str, key: &str, body: Vec<u8>) -> StoreResult<()> {
        self.http
            .put_bytes(&Self::object_path(collection, key), body)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}
