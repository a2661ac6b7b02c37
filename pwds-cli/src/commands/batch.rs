//! Batch command handler
//!
//! Generates size-reference images for rows of an exported prediction log.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use pwds_core::domain::prompt::PredictionRecord;
use std::path::{Path, PathBuf};

use super::{RenderArgs, build_service, print_outcome};
use crate::config::Config;
use crate::scheduler::CancelToken;

/// Arguments of `pwds batch`
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON array of prediction-log records
    #[arg(long)]
    input: PathBuf,

    /// Maximum number of generation jobs to run
    #[arg(long, default_value_t = 1)]
    max_jobs: usize,

    #[command(flatten)]
    render: RenderArgs,
}

/// Handle `pwds batch`
///
/// Individual job failures are reported but do not fail the command.
pub async fn handle_batch(args: BatchArgs, config: &Config, cancel: &CancelToken) -> Result<()> {
    let records = load_records(&args.input).await?;
    let service = build_service(config, &args.render)?;

    println!(
        "{}",
        format!(
            "Loaded {} record(s); generating up to {} image(s)",
            records.len(),
            args.max_jobs
        )
        .bold()
    );
    println!();

    let summary = service
        .generate_for_records(&records, args.max_jobs, cancel)
        .await?;

    for outcome in &summary.outcomes {
        print_outcome(outcome);
        println!();
    }

    let saved = summary.outcomes.iter().filter(|o| o.is_saved()).count();
    println!(
        "{} saved, {} not saved, {} record(s) skipped",
        saved.to_string().green(),
        (summary.outcomes.len() - saved).to_string().yellow(),
        summary.skipped.to_string().dimmed()
    );

    if summary.cancelled {
        println!("{}", "Batch cancelled".yellow());
    }

    Ok(())
}

async fn load_records(path: &Path) -> Result<Vec<PredictionRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "breed": "Corgi", "gender": "male", "predicted_weight": 12.0, "line_user_id": "U1"},
                {"id": 2, "breed": null}
            ]"#,
        )
        .unwrap();

        let records = load_records(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].breed.as_deref(), Some("Corgi"));
        assert!(records[1].size_reference().is_none());
    }

    #[tokio::test]
    async fn test_load_records_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"{"breed": "Corgi"}"#).unwrap();

        assert!(load_records(&path).await.is_err());
    }
}
