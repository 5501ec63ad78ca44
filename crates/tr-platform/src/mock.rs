//! Mock platform pieces for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use tr_core::store::MemoryObjectStore;

use crate::client::{PlatformClient, PlatformClientBuilder};
use crate::error::{PlatformError, PlatformResult};
use crate::integrations::{CommandDispatcher, ExecuteCommandRequest, ExecuteCommandResponse};

/// A [`CommandDispatcher`] that records requests and replays scripted
/// replies in order.
#[derive(Default)]
pub struct MockCommandDispatcher {
    requests: Mutex<Vec<ExecuteCommandRequest>>,
    replies: Mutex<VecDeque<PlatformResult<Option<ExecuteCommandResponse>>>>,
}

impl MockCommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the reply for the next execution.
    pub async fn push_reply(&self, reply: PlatformResult<Option<ExecuteCommandResponse>>) {
        self.replies.lock().await.push_back(reply);
    }

    /// Requests recorded so far.
    pub async fn requests(&self) -> Vec<ExecuteCommandRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl CommandDispatcher for MockCommandDispatcher {
    async fn execute(
        &self,
        request: ExecuteCommandRequest,
    ) -> PlatformResult<Option<ExecuteCommandResponse>> {
        self.requests.lock().await.push(request);

        self.replies.lock().await.pop_front().unwrap_or_else(|| {
            Err(PlatformError::RequestFailed(
                "mock dispatcher has no scripted reply".to_string(),
            ))
        })
    }
}

/// A [`PlatformClientBuilder`] handing out clients over shared in-memory
/// storage and a mock dispatcher.
pub struct MockClientBuilder {
    store: Arc<MemoryObjectStore>,
    dispatcher: Arc<MockCommandDispatcher>,
    build_failure: std::sync::Mutex<Option<String>>,
}

impl MockClientBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryObjectStore::new()),
            dispatcher: Arc::new(MockCommandDispatcher::new()),
            build_failure: std::sync::Mutex::new(None),
        }
    }

    /// The shared storage backing every built client.
    pub fn store(&self) -> Arc<MemoryObjectStore> {
        self.store.clone()
    }

    /// The shared dispatcher backing every built client.
    pub fn dispatcher(&self) -> Arc<MockCommandDispatcher> {
        self.dispatcher.clone()
    }

    /// Makes the next `build` call fail with the given cause.
    pub fn fail_next_build(&self, message: impl Into<String>) {
        *self.build_failure.lock().unwrap() = Some(message.into());
    }
}

impl Default for MockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformClientBuilder for MockClientBuilder {
    fn build(&self, _access_token: Option<&str>) -> PlatformResult<PlatformClient> {
        if let Some(message) = self.build_failure.lock().unwrap().take() {
            return Err(PlatformError::ConfigError(message));
        }

        Ok(PlatformClient::new(
            self.store.clone(),
            self.dispatcher.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tr_core::store::ObjectStore;

    fn sample_request() -> ExecuteCommandRequest {
        ExecuteCommandRequest {
            definition_id: "servicenow-foundry".to_string(),
            operation_id: "create_incident".to_string(),
            config_id: "cfg-1".to_string(),
            request: json!({"short_description": "s"}),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let dispatcher = MockCommandDispatcher::new();
        dispatcher
            .push_reply(Ok(Some(ExecuteCommandResponse::with_resource_body(
                json!({"result": {"sys_id": "a"}}),
            ))))
            .await;
        dispatcher.push_reply(Ok(None)).await;

        let first = dispatcher.execute(sample_request()).await.unwrap();
        assert!(first.is_some());

        let second = dispatcher.execute(sample_request()).await.unwrap();
        assert!(second.is_none());

        assert_eq!(dispatcher.request_count().await, 2);
    }

    #[tokio::test]
    async fn test_unscripted_execution_fails() {
        let dispatcher = MockCommandDispatcher::new();
        let err = dispatcher.execute(sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("no scripted reply"));
    }

    #[tokio::test]
    async fn test_builder_shares_backends() {
        let builder = MockClientBuilder::new();

        let client = builder.build(Some("token")).unwrap();
        client
            .object_store()
            .put("tracked_entities", "k", b"v".to_vec())
            .await
            .unwrap();

        // A second client sees the same data.
        let other = builder.build(None).unwrap();
        assert!(other.object_store().get("tracked_entities", "k").await.is_ok());
    }

    #[test]
    fn test_builder_failure_injection() {
        let builder = MockClientBuilder::new();
        builder.fail_next_build("credentials rejected");

        let err = builder.build(None).unwrap_err();
        assert!(err.to_string().contains("credentials rejected"));

        assert!(builder.build(None).is_ok());
    }
}
