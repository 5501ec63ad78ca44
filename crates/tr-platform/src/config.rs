//! Platform client configuration and credential resolution.

use crate::error::{PlatformError, PlatformResult};
use crate::secure_string::SecureString;

/// Environment override for the Falcon cloud region.
pub const ENV_FALCON_CLOUD: &str = "FALCON_CLOUD";
/// Environment fallback client id, used when a request carries no access
/// token.
pub const ENV_FALCON_CLIENT_ID: &str = "FALCON_CLIENT_ID";
/// Environment fallback client secret.
pub const ENV_FALCON_CLIENT_SECRET: &str = "FALCON_CLIENT_SECRET";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Falcon cloud regions and their API base URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FalconCloud {
    #[default]
    Us1,
    Us2,
    Eu1,
    UsGov1,
}

impl FalconCloud {
    pub fn parse(value: &str) -> PlatformResult<Self> {
        match value.to_lowercase().as_str() {
            "us-1" => Ok(FalconCloud::Us1),
            "us-2" => Ok(FalconCloud::Us2),
            "eu-1" => Ok(FalconCloud::Eu1),
            "us-gov-1" => Ok(FalconCloud::UsGov1),
            other => Err(PlatformError::ConfigError(format!(
                "unknown Falcon cloud region: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FalconCloud::Us1 => "us-1",
            FalconCloud::Us2 => "us-2",
            FalconCloud::Eu1 => "eu-1",
            FalconCloud::UsGov1 => "us-gov-1",
        }
    }

    pub fn api_base_url(&self) -> &'static str {
        match self {
            FalconCloud::Us1 => "https://api.crowdstrike.com",
            FalconCloud::Us2 => "https://api.us-2.crowdstrike.com",
            FalconCloud::Eu1 => "https://api.eu-1.crowdstrike.com",
            FalconCloud::UsGov1 => "https://api.laggar.gcw.crowdstrike.com",
        }
    }
}

impl std::fmt::Display for FalconCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the client authenticates against the platform.
#[derive(Debug, Clone)]
pub enum PlatformCredentials {
    /// Per-request access token forwarded from the caller.
    AccessToken(SecureString),
    /// OAuth2 client credentials, exchanged for a token lazily.
    ClientCredentials {
        client_id: String,
        client_secret: SecureString,
    },
}

/// Resolved configuration for one platform client.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub cloud: FalconCloud,
    pub credentials: PlatformCredentials,
    pub timeout_secs: u64,
}

impl PlatformConfig {
    pub fn new(cloud: FalconCloud, credentials: PlatformCredentials) -> Self {
        Self {
            cloud,
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Resolves a configuration for one request.
    ///
    /// Cloud selection starts from the configured override and the
    /// `FALCON_CLOUD` environment variable wins when set. When the request
    /// carried no access token, client credentials are read from the
    /// environment.
    pub fn resolve(
        access_token: Option<&str>,
        cloud_override: Option<&str>,
    ) -> PlatformResult<Self> {
        let env_cloud = std::env::var(ENV_FALCON_CLOUD).ok();
        let cloud = match env_cloud.as_deref().filter(|v| !v.is_empty()) {
            Some(value) => FalconCloud::parse(value)?,
            None => match cloud_override.filter(|v| !v.is_empty()) {
                Some(value) => FalconCloud::parse(value)?,
                None => FalconCloud::default(),
            },
        };

        let credentials = match access_token.filter(|t| !t.is_empty()) {
            Some(token) => PlatformCredentials::AccessToken(SecureString::from(token)),
            None => {
                let client_id = std::env::var(ENV_FALCON_CLIENT_ID).unwrap_or_default();
                let client_secret = std::env::var(ENV_FALCON_CLIENT_SECRET).unwrap_or_default();

                if client_id.is_empty() || client_secret.is_empty() {
                    return Err(PlatformError::ConfigError(
                        "no access token provided and no client credentials in the environment"
                            .to_string(),
                    ));
                }

                PlatformCredentials::ClientCredentials {
                    client_id,
                    client_secret: SecureString::new(client_secret),
                }
            }
        };

        Ok(Self::new(cloud, credentials))
    }
}
