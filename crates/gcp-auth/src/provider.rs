//! Token provider
//!
//! Picks one of the two token strategies per call. Neither strategy retries.

use crate::error::AuthError;
use crate::helper::CredentialHelper;
use crate::models::AccessToken;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// Google OAuth2 token introspection endpoint
pub const DEFAULT_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";

/// Default service account token on the instance metadata server
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Endpoints used by the two strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEndpoints {
    pub tokeninfo_url: String,
    pub metadata_token_url: String,
}

impl Default for TokenEndpoints {
    fn default() -> Self {
        Self {
            tokeninfo_url: DEFAULT_TOKENINFO_URL.to_string(),
            metadata_token_url: DEFAULT_METADATA_TOKEN_URL.to_string(),
        }
    }
}

pub struct TokenProvider {
    client: Client,
    endpoints: TokenEndpoints,
    helper: Box<dyn CredentialHelper>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Create a provider
    ///
    /// # Arguments
    /// * `endpoints` - tokeninfo and metadata URLs
    /// * `helper` - credential helper for the local strategy
    /// * `timeout` - Upper bound for each HTTP request
    pub fn new(
        endpoints: TokenEndpoints,
        helper: Box<dyn CredentialHelper>,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints,
            helper,
        })
    }

    /// Resolve a fresh access token
    ///
    /// `use_metadata_endpoint` selects the metadata-server strategy; otherwise
    /// the local credential helper is run and its token validated.
    pub async fn resolve(&self, use_metadata_endpoint: bool) -> Result<AccessToken, AuthError> {
        if use_metadata_endpoint {
            self.metadata_server_token().await
        } else {
            self.local_credentials_token().await
        }
    }

    /// Run the credential helper, then check the token against tokeninfo.
    /// Only 200 from tokeninfo is accepted.
    pub async fn local_credentials_token(&self) -> Result<AccessToken, AuthError> {
        let raw = self.helper.print_access_token().await?;

        debug!("Validating minted token at {}", self.endpoints.tokeninfo_url);
        let response = self
            .client
            .get(&self.endpoints.tokeninfo_url)
            .query(&[("access_token", raw.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::InvalidToken {
                status: status.as_u16(),
            });
        }

        info!("Using access token from local credential helper");
        Ok(AccessToken::from_raw(raw))
    }

    /// Fetch the default service account token from the metadata server.
    /// The response body is taken as the token payload as-is.
    pub async fn metadata_server_token(&self) -> Result<AccessToken, AuthError> {
        debug!("Fetching token from {}", self.endpoints.metadata_token_url);
        let response = self
            .client
            .get(&self.endpoints.metadata_token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::TokenFetchFailed {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let token: AccessToken = serde_json::from_str(&text)?;
        info!(
            "Using access token from metadata server (expires in {}s)",
            token.expires_in.map_or_else(|| "?".to_string(), |s| s.to_string())
        );
        Ok(token)
    }
}
