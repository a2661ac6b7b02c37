//! Status command handler

use anyhow::{Context, Result};
use colored::*;
use pwds_core::domain::job::Job;

use super::colorize_status;
use crate::config::Config;

/// Fetch a job once and print it
pub async fn handle_status(id: &str, config: &Config) -> Result<()> {
    let client = config.build_client()?;

    let prediction = client
        .get_prediction(id)
        .await
        .with_context(|| format!("Failed to fetch job {}", id))?;
    let job = Job::from(prediction);

    print_job_details(&job);

    Ok(())
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:       {}", job.id.cyan());
    println!("  Status:   {}", colorize_status(job.status));

    if let Some(created) = job.created_at {
        println!("  Created:  {}", created.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(output) = &job.output {
        println!("  Output:   {}", output);
    } else if job.is_terminal() {
        println!("  Output:   {}", "(none)".dimmed());
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}
