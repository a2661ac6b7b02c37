//! CLI configuration
//!
//! Holds the prediction API connection settings and the polling limits.
//! Built from command-line arguments with environment fallbacks; see `main`.

use anyhow::{Context, Result, bail};
use pwds_client::PredictionClient;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::{PollerConfig, RetryPolicy};

pub const DEFAULT_API_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str = "black-forest-labs/flux-1.1-pro";

/// CLI configuration
#[derive(Clone)]
pub struct Config {
    /// Base URL of the prediction API
    pub api_url: String,

    /// Bearer token for the prediction API
    pub api_token: Option<String>,

    /// Model version every job is submitted to
    pub model_version: String,

    /// Delay between status checks of a running job
    pub poll_interval: Duration,

    /// Maximum time spent polling one job (`None` disables the limit)
    pub poll_timeout: Option<Duration>,

    /// Maximum number of status checks for one job
    pub max_poll_attempts: Option<u32>,

    /// Retries of transient API errors per call
    pub max_retries: u32,

    /// Timeout of each individual HTTP request
    pub request_timeout: Duration,

    /// Directory generated images are written to
    pub output_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("model_version", &self.model_version)
            .field("poll_interval", &self.poll_interval)
            .field("poll_timeout", &self.poll_timeout)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("max_retries", &self.max_retries)
            .field("request_timeout", &self.request_timeout)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!("api_url must start with http:// or https://");
        }

        if self.model_version.trim().is_empty() {
            bail!("model_version cannot be empty");
        }

        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than 0");
        }

        if self.poll_timeout.is_some_and(|t| t.is_zero()) {
            bail!("poll_timeout must be greater than 0");
        }

        if self.max_poll_attempts == Some(0) {
            bail!("max_poll_attempts must be greater than 0");
        }

        // Polling must stop eventually
        if self.poll_timeout.is_none() && self.max_poll_attempts.is_none() {
            bail!("either poll_timeout or max_poll_attempts must be set");
        }

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Poller settings derived from this configuration
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            poll_interval: self.poll_interval,
            timeout: self.poll_timeout,
            max_attempts: self.max_poll_attempts,
            retry: RetryPolicy::new(self.max_retries),
        }
    }

    /// Builds an authenticated prediction client
    pub fn build_client(&self) -> Result<PredictionClient> {
        let token = match self.api_token.as_deref() {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!("no API token configured (set PWDS_API_TOKEN or pass --api-token)"),
        };

        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(PredictionClient::with_client(self.api_url.clone(), http_client).with_token(token))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            model_version: DEFAULT_MODEL.to_string(),
            poll_interval: Duration::from_secs(2),
            poll_timeout: Some(Duration::from_secs(300)),
            max_poll_attempts: None,
            max_retries: 0,
            request_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
        }
    }
}
