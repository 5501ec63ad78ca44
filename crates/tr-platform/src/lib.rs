//! Credentialed client for the Falcon platform.
//!
//! The platform exposes the two capabilities Ticket Relay uses: the
//! custom-storage key-value backend (implemented here as an
//! [`ObjectStore`](tr_core::ObjectStore) over its REST surface) and the
//! API-integrations dispatcher that executes a named operation against a
//! named integration configuration. ServiceNow payload shaping and result
//! extraction live in [`itsm`].

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod integrations;
pub mod itsm;
pub mod mock;
pub mod secure_string;
pub mod storage;

pub use client::{FalconClientBuilder, PlatformClient, PlatformClientBuilder};
pub use config::{FalconCloud, PlatformConfig, PlatformCredentials};
pub use error::{PlatformError, PlatformResult};
pub use integrations::{
    ApiIntegrations, CommandDispatcher, CommandResource, ExecuteCommandRequest,
    ExecuteCommandResponse, ExecutePayload, DEFINITION_ID_SERVICENOW,
};
pub use mock::{MockClientBuilder, MockCommandDispatcher};
pub use secure_string::SecureString;
pub use storage::FalconObjectStore;
