//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod batch;
mod generate;
mod status;

pub use batch::BatchArgs;
pub use generate::GenerateArgs;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use pwds_client::PredictionApi;
use pwds_core::domain::job::JobStatus;
use pwds_core::domain::request::OutputFormat;
use std::sync::Arc;

use crate::config::Config;
use crate::scheduler::{CancelToken, JobPoller, PollerError};
use crate::service::{GenerationOutcome, GenerationService, RenderOptions};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate one image from a prompt or a dog's predicted size
    Generate(GenerateArgs),
    /// Generate size-reference images for prediction-log records
    Batch(BatchArgs),
    /// Show the current status of a generation job
    Status {
        /// Job ID assigned by the prediction service
        id: String,
    },
}

/// Rendering options accepted by generating commands
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Image width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Number of inference steps
    #[arg(long, default_value_t = 28)]
    steps: u32,

    /// Guidance scale
    #[arg(long, default_value_t = 3.5)]
    guidance_scale: f32,

    /// Random seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output format (png, jpg, webp)
    #[arg(long, default_value = "png")]
    format: OutputFormat,

    /// Output quality (0-100)
    #[arg(long, default_value_t = 80)]
    quality: u8,
}

impl From<&RenderArgs> for RenderOptions {
    fn from(args: &RenderArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            num_inference_steps: args.steps,
            guidance_scale: args.guidance_scale,
            seed: args.seed,
            output_format: args.format,
            output_quality: args.quality,
        }
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
/// * `cancel` - Raised when the user interrupts the run
pub async fn handle_command(command: Commands, config: &Config, cancel: CancelToken) -> Result<()> {
    match command {
        Commands::Generate(args) => generate::handle_generate(args, config, &cancel).await,
        Commands::Batch(args) => batch::handle_batch(args, config, &cancel).await,
        Commands::Status { id } => status::handle_status(&id, config).await,
    }
}

/// Wires the client, poller and generation service together
fn build_service(config: &Config, render: &RenderArgs) -> Result<GenerationService> {
    let api: Arc<dyn PredictionApi> = Arc::new(config.build_client()?);
    let poller = JobPoller::new(Arc::clone(&api), config.poller_config());

    Ok(GenerationService::new(
        poller,
        api,
        config.model_version.clone(),
        RenderOptions::from(render),
        config.output_dir.clone(),
    ))
}

/// Print the outcome of one generation job
fn print_outcome(outcome: &GenerationOutcome) {
    match outcome {
        GenerationOutcome::Saved { job_id, uri, path } => {
            println!("{} Job {}", "✓".green(), job_id.cyan());
            println!("  Image: {}", uri.dimmed());
            println!("  Saved: {}", path.display());
        }
        GenerationOutcome::EmptyOutput { job_id } => {
            println!(
                "{} Job {} succeeded but returned no image",
                "⚠".yellow(),
                job_id.cyan()
            );
        }
        GenerationOutcome::GenerationFailed { job_id, message } => {
            println!("{} Job {} failed", "✗".red(), job_id.cyan());
            println!("  {}", message.red());
        }
        GenerationOutcome::SaveFailed { job_id, uri, error } => {
            println!(
                "{} Job {} produced an image that could not be saved",
                "✗".red(),
                job_id.cyan()
            );
            println!("  Image: {}", uri.dimmed());
            println!("  {}", error.red());
        }
        GenerationOutcome::Aborted(PollerError::Cancelled { job_id }) => match job_id {
            Some(job_id) => println!("{} Job {} abandoned", "⚠".yellow(), job_id.cyan()),
            None => println!("{} Generation cancelled", "⚠".yellow()),
        },
        GenerationOutcome::Aborted(e) => {
            println!("{} {}", "✗".red(), e.to_string().red());
        }
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Starting => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Succeeded => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Canceled | JobStatus::Unknown => status_str.dimmed(),
    }
}
