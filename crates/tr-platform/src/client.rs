//! Per-request platform client construction.

use std::sync::Arc;
use tracing::info;

use tr_core::store::ObjectStore;

use crate::config::PlatformConfig;
use crate::error::PlatformResult;
use crate::http::HttpClient;
use crate::integrations::{ApiIntegrations, CommandDispatcher};
use crate::storage::FalconObjectStore;

/// The two platform capabilities Ticket Relay consumes.
pub struct PlatformClient {
    store: Arc<dyn ObjectStore>,
    dispatcher: Arc<dyn CommandDispatcher>,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient").finish_non_exhaustive()
    }
}

impl PlatformClient {
    pub fn new(store: Arc<dyn ObjectStore>, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    pub fn dispatcher(&self) -> Arc<dyn CommandDispatcher> {
        self.dispatcher.clone()
    }
}

/// Builds a client for one request from its access credential.
///
/// Handlers construct a fresh client per invocation; the builder is the
/// seam tests replace with [`MockClientBuilder`](crate::MockClientBuilder).
pub trait PlatformClientBuilder: Send + Sync {
    fn build(&self, access_token: Option<&str>) -> PlatformResult<PlatformClient>;
}

/// Production builder targeting the Falcon APIs.
#[derive(Debug, Clone, Default)]
pub struct FalconClientBuilder {
    cloud_override: Option<String>,
}

impl FalconClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the cloud region instead of relying on the environment.
    pub fn with_cloud(cloud: impl Into<String>) -> Self {
        Self {
            cloud_override: Some(cloud.into()),
        }
    }
}

impl PlatformClientBuilder for FalconClientBuilder {
    fn build(&self, access_token: Option<&str>) -> PlatformResult<PlatformClient> {
        let config = PlatformConfig::resolve(access_token, self.cloud_override.as_deref())?;

        info!(cloud = %config.cloud, "creating Falcon client");

        let http = Arc::new(HttpClient::new(&config)?);

        Ok(PlatformClient::new(
            Arc::new(FalconObjectStore::new(http.clone())),
            Arc::new(ApiIntegrations::new(http)),
        ))
    }
}
