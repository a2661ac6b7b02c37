//! PWDS Prediction Client
//!
//! A small, type-safe HTTP client for a job-based text-to-image prediction API.
//!
//! The [`PredictionApi`] trait is the seam the job poller is written against;
//! [`PredictionClient`] implements it over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use pwds_client::PredictionClient;
//! use pwds_core::domain::request::{GenerationInput, JobRequest};
//! use pwds_core::dto::prediction::CreatePrediction;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PredictionClient::new("https://api.replicate.com/v1").with_token("r8_...");
//!
//!     let request = JobRequest::new("black-forest-labs/flux-1.1-pro", GenerationInput::new("a dog"))?;
//!     let prediction = client.create_prediction(&CreatePrediction::from(&request)).await?;
//!
//!     println!("Created prediction: {}", prediction.id);
//!     Ok(())
//! }
//! ```

mod api;
pub mod error;
mod predictions;

// Re-export commonly used types
pub use api::PredictionApi;
pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;

/// HTTP client for the prediction API
#[derive(Clone)]
pub struct PredictionClient {
    /// Base URL of the API (e.g., "https://api.replicate.com/v1")
    base_url: String,
    /// Bearer token sent with every API call
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl fmt::Debug for PredictionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl PredictionClient {
    /// Create a new prediction client
    ///
    /// # Example
    /// ```
    /// use pwds_client::PredictionClient;
    ///
    /// let client = PredictionClient::new("https://api.replicate.com/v1");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new prediction client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use pwds_client::PredictionClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = PredictionClient::with_client("https://api.replicate.com/v1", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Set the bearer token used for API calls
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start an authenticated request against the API
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle a response whose body is raw bytes (e.g., a generated image)
    async fn handle_bytes_response(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;

        Ok(bytes.to_vec())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}
