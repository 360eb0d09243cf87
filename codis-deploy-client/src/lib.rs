//! Codis Deploy Docker Client
//!
//! A small, type-safe client for the subset of the Docker remote API the
//! deployment tool needs: ping, image pull, container create/start/inspect/remove
//! and exec.
//!
//! # Example
//!
//! ```no_run
//! use codis_deploy_client::DockerClient;
//! use codis_deploy_core::domain::container::ContainerSpec;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DockerClient::new("http://192.168.156.200:2375");
//!
//!     let spec = ContainerSpec::new("redis-test", "192.168.156.200:5000/redis")
//!         .with_port(6379, "0.0.0.0", 6379);
//!     let id = client.create_container(&spec).await?;
//!     client.start_container(&id).await?;
//!
//!     println!("Started container: {}", id);
//!     Ok(())
//! }
//! ```

mod api;
mod containers;
pub mod error;
mod exec;
mod images;
pub mod stream;
mod system;

// Re-export commonly used types
pub use api::{ContainerApi, ExecHandle};
pub use error::{ClientError, Result};

use codis_deploy_core::dto::ApiErrorBody;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout applied to short, non-streaming API calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit for attached exec streams, read until the command exits
pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client for the Docker remote API
///
/// Calls are grouped by resource:
/// - System (ping)
/// - Images (pull)
/// - Containers (create, start, inspect, remove)
/// - Exec (create, start, inspect)
#[derive(Debug, Clone)]
pub struct DockerClient {
    /// Base URL of the Docker or Swarm endpoint (e.g., "http://192.168.156.200:2375")
    base_url: String,
    /// Optional API version path prefix (e.g., "/v1.24")
    version_prefix: String,
    /// Timeout for non-streaming calls
    request_timeout: Duration,
    /// Timeout for attached exec streams
    attach_timeout: Duration,
    /// HTTP client instance
    client: Client,
}

impl DockerClient {
    /// Create a new Docker client
    ///
    /// # Arguments
    /// * `base_url` - The endpoint URL (e.g., "http://192.168.156.200:2375")
    ///
    /// # Example
    /// ```
    /// use codis_deploy_client::DockerClient;
    ///
    /// let client = DockerClient::new("http://192.168.156.200:2375");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new Docker client with a custom HTTP client
    ///
    /// This allows you to configure connect timeouts, connection pooling, proxies, etc.
    ///
    /// # Example
    /// ```
    /// use codis_deploy_client::DockerClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .connect_timeout(Duration::from_secs(5))
    ///     .pool_idle_timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = DockerClient::with_client("http://192.168.156.200:2375", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version_prefix: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            attach_timeout: DEFAULT_ATTACH_TIMEOUT,
            client,
        }
    }

    /// Pin requests to an API version (`"1.24"` or `"v1.24"`)
    pub fn with_api_version(mut self, version: impl AsRef<str>) -> Self {
        let version = version.as_ref().trim().trim_start_matches('v');
        self.version_prefix = if version.is_empty() {
            String::new()
        } else {
            format!("/v{}", version)
        };
        self
    }

    /// Override the timeout for non-streaming calls
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override how long an attached exec may stream before it is abandoned
    pub fn with_attach_timeout(mut self, timeout: Duration) -> Self {
        self.attach_timeout = timeout;
        self
    }

    /// Get the base URL of the endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host part of the endpoint URL, used when the API does not report a node address
    pub fn endpoint_host(&self) -> &str {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        let authority = without_scheme.split('/').next().unwrap_or(without_scheme);
        match authority.rsplit_once(':') {
            Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
            _ => authority,
        }
    }

    /// Build a full URL for an API path
    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.version_prefix, path)
    }

    /// Reject empty ids and names before they turn into a different API path
    fn require(what: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ClientError::InvalidRequest(format!("{} cannot be empty", what)));
        }
        Ok(())
    }

    /// Apply the short-call timeout
    fn short(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.timeout(self.request_timeout)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-success response into an `ApiError`
    ///
    /// Docker error bodies are `{"message": "..."}`; anything else is kept verbatim.
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ApiErrorBody>(&error_text)
            .map(|body| body.message)
            .unwrap_or_else(|_| error_text.trim().to_string());
        ClientError::api_error(status.as_u16(), message)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    ///
    /// 304 Not Modified (e.g. starting an already started container) counts as success.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() && status != StatusCode::NOT_MODIFIED {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    /// Handle an API response whose body is read whole as bytes
    async fn handle_bytes_response(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}
