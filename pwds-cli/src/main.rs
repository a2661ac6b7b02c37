//! pwds
//!
//! Command-line client that generates images on a remote prediction service.
//!
//! Architecture:
//! - Configuration: Command-line arguments with environment fallbacks
//! - Scheduler: Job submission, status polling, retry and cancellation
//! - Services: Size-reference prompts, batch runs and saving outputs
//! - Commands: User-facing subcommands and terminal output
//!
//! Every job is submitted once and polled until it reaches a terminal state,
//! the time or attempt limit is hit, or the user presses Ctrl-C.

mod commands;
mod config;
mod scheduler;
mod service;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Commands, handle_command};
use crate::config::{Config, DEFAULT_API_URL, DEFAULT_MODEL};
use crate::scheduler::cancel_channel;

#[derive(Parser)]
#[command(name = "pwds")]
#[command(about = "Image generation job runner", long_about = None)]
struct Cli {
    /// Prediction API base URL
    #[arg(long, env = "PWDS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Prediction API token
    #[arg(long, env = "PWDS_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Model version jobs are submitted to
    #[arg(long, env = "PWDS_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Seconds between status checks
    #[arg(long, env = "PWDS_POLL_INTERVAL", default_value_t = 2)]
    poll_interval: u64,

    /// Seconds before a job is given up (0 disables the limit)
    #[arg(long, env = "PWDS_POLL_TIMEOUT", default_value_t = 300)]
    poll_timeout: u64,

    /// Maximum status checks per job
    #[arg(long, env = "PWDS_MAX_POLL_ATTEMPTS")]
    max_poll_attempts: Option<u32>,

    /// Retries of transient API errors per call
    #[arg(long, env = "PWDS_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Seconds before a single HTTP request is aborted
    #[arg(long, env = "PWDS_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    /// Directory generated images are written to
    #[arg(long, env = "PWDS_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            api_url: self.api_url.clone(),
            api_token: self.api_token.clone(),
            model_version: self.model.clone(),
            poll_interval: Duration::from_secs(self.poll_interval),
            poll_timeout: (self.poll_timeout > 0).then(|| Duration::from_secs(self.poll_timeout)),
            max_poll_attempts: self.max_poll_attempts,
            max_retries: self.max_retries,
            request_timeout: Duration::from_secs(self.request_timeout),
            output_dir: self.output_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pwds=info,pwds_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = cli.config();
    config.validate()?;
    info!(
        "Loaded configuration: api_url={}, model={}",
        config.api_url, config.model_version
    );

    let (handle, cancel) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            handle.cancel();
        }
    });

    handle_command(cli.command, &config, cancel).await
}
