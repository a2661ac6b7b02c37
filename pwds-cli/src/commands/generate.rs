//! Generate command handler

use anyhow::{Context, Result, bail};
use clap::Args;
use pwds_core::domain::prompt::{Gender, SizeReference};

use super::{RenderArgs, build_service, print_outcome};
use crate::config::Config;
use crate::scheduler::CancelToken;
use crate::service::GenerationOutcome;

/// Arguments of `pwds generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Free-form prompt
    #[arg(long, required_unless_present = "breed", conflicts_with = "breed")]
    prompt: Option<String>,

    /// Dog breed for a size-reference image
    #[arg(long, requires_all = ["gender", "weight"])]
    breed: Option<String>,

    /// Dog gender (male/female)
    #[arg(long)]
    gender: Option<String>,

    /// Predicted adult weight in kg
    #[arg(long)]
    weight: Option<f64>,

    #[command(flatten)]
    render: RenderArgs,
}

impl GenerateArgs {
    fn size_reference(&self) -> Result<Option<SizeReference>> {
        let (Some(breed), Some(gender), Some(weight)) = (&self.breed, &self.gender, self.weight)
        else {
            return Ok(None);
        };

        let gender: Gender = gender.parse()?;
        let subject =
            SizeReference::new(breed.as_str(), gender, weight).context("Invalid dog details")?;
        Ok(Some(subject))
    }
}

/// Handle `pwds generate`
///
/// Fails unless an image was saved; an empty output is reported but not
/// treated as an error.
pub async fn handle_generate(args: GenerateArgs, config: &Config, cancel: &CancelToken) -> Result<()> {
    let service = build_service(config, &args.render)?;

    let outcome = match (args.size_reference()?, &args.prompt) {
        (Some(subject), _) => service.generate_size_reference(&subject, cancel).await?,
        (None, Some(prompt)) => service.generate_prompt(prompt, cancel).await?,
        (None, None) => bail!("either --prompt or --breed/--gender/--weight is required"),
    };

    print_outcome(&outcome);

    match outcome {
        GenerationOutcome::Saved { .. } | GenerationOutcome::EmptyOutput { .. } => Ok(()),
        GenerationOutcome::GenerationFailed { job_id, message } => {
            bail!("job {} failed: {}", job_id, message)
        }
        GenerationOutcome::SaveFailed { job_id, error, .. } => {
            bail!("could not save output of job {}: {}", job_id, error)
        }
        GenerationOutcome::Aborted(e) => Err(e.into()),
    }
}
