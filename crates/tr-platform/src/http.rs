//! HTTP plumbing for the platform client.
//!
//! A thin wrapper over `reqwest` that attaches credentials and maps
//! failures onto [`PlatformError`]. A 404 becomes a distinct not-found
//! error so the storage layer can treat it as an ordinary miss. No retries
//! happen here; the calling workflow engine owns retry policy.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{PlatformConfig, PlatformCredentials};
use crate::error::{PlatformError, PlatformResult};
use crate::secure_string::SecureString;

const OAUTH_TOKEN_PATH: &str = "/oauth2/token";

/// Slack subtracted from the token lifetime so a token is refreshed before
/// it expires mid-request.
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Credentialed HTTP client for one platform API base URL.
pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: PlatformCredentials,
    oauth_token: RwLock<Option<OAuthToken>>,
}

#[derive(Clone)]
struct OAuthToken {
    access_token: SecureString,
    expires_at: Instant,
}

impl HttpClient {
    pub fn new(config: &PlatformConfig) -> PlatformResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| PlatformError::ConfigError(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.cloud.api_base_url().to_string(),
            credentials: config.credentials.clone(),
            oauth_token: RwLock::new(None),
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Executes a GET and returns the raw response body.
    pub async fn get_bytes(&self, path: &str) -> PlatformResult<Vec<u8>> {
        let response = self.send(self.client.get(self.build_url(path))).await?;
        read_body(response).await
    }

    /// Executes a PUT with a raw JSON body.
    pub async fn put_bytes(&self, path: &str, body: Vec<u8>) -> PlatformResult<()> {
        let request = self
            .client
            .put(self.build_url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        self.send(request).await?;
        Ok(())
    }

    /// Executes a POST with a JSON body and returns the raw response body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> PlatformResult<Vec<u8>> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.send(request).await?;
        read_body(response).await
    }

    async fn send(&self, request: RequestBuilder) -> PlatformResult<Response> {
        let request = self.authorize(request).await?;

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                PlatformError::Timeout(err.to_string())
            } else if err.is_connect() {
                PlatformError::ConnectionFailed(err.to_string())
            } else {
                PlatformError::RequestFailed(err.to_string())
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => Err(PlatformError::NotFound(format!(
                "status 404: {}",
                response.url().path()
            ))),
            StatusCode::UNAUTHORIZED => {
                Err(PlatformError::AuthenticationFailed("Unauthorized".into()))
            }
            _ if status.is_client_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(PlatformError::RequestFailed(format!(
                    "client error {}: {}",
                    status,
                    body.chars().take(500).collect::<String>()
                )))
            }
            _ if status.is_server_error() => Err(PlatformError::RequestFailed(format!(
                "server error: {}",
                status
            ))),
            _ => Ok(response),
        }
    }

    async fn authorize(&self, request: RequestBuilder) -> PlatformResult<RequestBuilder> {
        match &self.credentials {
            PlatformCredentials::AccessToken(token) => {
                Ok(request.bearer_auth(token.expose_secret()))
            }
            PlatformCredentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                let token = self.oauth_token(client_id, client_secret).await?;
                Ok(request.bearer_auth(token.expose_secret()))
            }
        }
    }

    /// Gets or refreshes the OAuth2 token for client-credential auth.
    async fn oauth_token(
        &self,
        client_id: &str,
        client_secret: &SecureString,
    ) -> PlatformResult<SecureString> {
        {
            let token = self.oauth_token.read().await;
            if let Some(t) = &*token {
                if t.expires_at > Instant::now() + TOKEN_EXPIRY_SLACK {
                    return Ok(t.access_token.clone());
                }
            }
        }

        info!("fetching new OAuth2 token");

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
        ];

        let response = self
            .client
            .post(self.build_url(OAUTH_TOKEN_PATH))
            .form(&params)
            .send()
            .await
            .map_err(|err| PlatformError::AuthenticationFailed(err.to_string()))?;

        if !response.status().is_success() {
            return Err(PlatformError::AuthenticationFailed(format!(
                "token request failed: {}",
                response.status()
            )));
        }

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|err| PlatformError::InvalidResponse(err.to_string()))?;

        let access_token = SecureString::new(token_response.access_token);
        let oauth_token = OAuthToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token_response.expires_in),
        };

        *self.oauth_token.write().await = Some(oauth_token);

        Ok(access_token)
    }
}

async fn read_body(response: Response) -> PlatformResult<Vec<u8>> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|err| PlatformError::InvalidResponse(err.to_string()))
}
