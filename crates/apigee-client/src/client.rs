//! Apigee API client
//!
//! Implements the entry-level calls of the KVM API.
//! Based on the Apigee API structure:
//! /v1/organizations/{org}/environments/{env}/keyvaluemaps/{kvm}/entries

use crate::apigee_trait::ApigeeClientTrait;
use crate::error::ApigeeError;
use crate::models::{KvmEntry, KvmPath};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Public Apigee management API host
pub const DEFAULT_MGMT_URL: &str = "https://apigee.googleapis.com";

/// Apigee management API client
pub struct ApigeeClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ApigeeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApigeeClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ApigeeClient {
    /// Create a new Apigee client
    ///
    /// # Arguments
    /// * `base_url` - Management API base URL (e.g., "https://apigee.googleapis.com")
    /// * `token` - OAuth2 bearer token
    /// * `timeout` - Upper bound for each individual request
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, ApigeeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// Fetch a single entry by name
    ///
    /// # Returns
    /// * `Ok(Some(KvmEntry))` - The entry exists (200)
    /// * `Ok(None)` - The entry does not exist (404)
    /// * `Err(ApigeeError)` - Any other status or a transport failure
    pub async fn get_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<Option<KvmEntry>, ApigeeError> {
        let url = self.build_url(&path.entry_path(name));
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::OK => {
                let entry: KvmEntry = decode(response).await?;
                Ok(Some(entry))
            }
            StatusCode::NOT_FOUND => {
                debug!("KVM entry {} not found in {}", name, path);
                Ok(None)
            }
            _ => Err(unexpected_status("GET", url, response).await),
        }
    }

    /// Delete a single entry by name. Only 200 counts as success.
    pub async fn delete_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<(), ApigeeError> {
        let url = self.build_url(&path.entry_path(name));
        debug!("DELETE {}", url);

        let response = self.authorized(self.client.delete(&url)).send().await?;

        if response.status() != StatusCode::OK {
            return Err(unexpected_status("DELETE", url, response).await);
        }

        Ok(())
    }

    /// Create an entry in the collection. Only 201 counts as success.
    ///
    /// # Returns
    /// The entry as represented by the API after creation
    pub async fn create_kvm_entry(&self, path: &KvmPath, entry: &KvmEntry) -> Result<KvmEntry, ApigeeError> {
        let url = self.build_url(&path.entries_path());
        debug!("POST {} with entry name {}", url, entry.name);

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(entry)?)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(unexpected_status("POST", url, response).await);
        }

        decode(response).await
    }
}

/// Read the body as text first so a decode failure can report what came back
async fn decode(response: Response) -> Result<KvmEntry, ApigeeError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        debug!(
            "error decoding response body: {} - Response (first 500 chars): {}",
            e,
            text.chars().take(500).collect::<String>()
        );
        ApigeeError::Serialization(e)
    })
}

async fn unexpected_status(method: &'static str, url: String, response: Response) -> ApigeeError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApigeeError::UnexpectedStatus {
        method,
        url,
        status,
        body: body.chars().take(500).collect(),
    }
}

#[async_trait::async_trait]
impl ApigeeClientTrait for ApigeeClient {
    fn base_url(&self) -> &str {
        ApigeeClient::base_url(self)
    }

    async fn get_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<Option<KvmEntry>, ApigeeError> {
        ApigeeClient::get_kvm_entry(self, path, name).await
    }

    async fn delete_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<(), ApigeeError> {
        ApigeeClient::delete_kvm_entry(self, path, name).await
    }

    async fn create_kvm_entry(&self, path: &KvmPath, entry: &KvmEntry) -> Result<KvmEntry, ApigeeError> {
        ApigeeClient::create_kvm_entry(self, path, entry).await
    }
}
