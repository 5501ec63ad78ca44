//! Application state shared across handlers.

use std::sync::Arc;

use tr_core::bucket::{Clock, SystemClock};
use tr_platform::client::PlatformClientBuilder;

/// Shared application state.
///
/// Handlers own no durable state: a fresh platform client is built per
/// request from the caller's credential, and the clock is the only
/// process-wide dependency besides the logger.
#[derive(Clone)]
pub struct AppState {
    /// Builds a credentialed platform client for one request.
    pub builder: Arc<dyn PlatformClientBuilder>,
    /// Time source for the bucket calculator.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates state with the wall clock.
    pub fn new(builder: Arc<dyn PlatformClientBuilder>) -> Self {
        Self {
            builder,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source; tests pin it to a fixed instant.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
