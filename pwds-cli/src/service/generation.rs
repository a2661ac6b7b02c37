//! Generation service
//!
//! Runs generation jobs through the poller and persists their outputs.
//! Generation problems are reported per job and never abort a batch.

use pwds_client::PredictionApi;
use pwds_core::domain::job::JobOutcome;
use pwds_core::domain::prompt::{PredictionRecord, SizeReference};
use pwds_core::domain::request::{GenerationInput, JobRequest, OutputFormat, ValidationError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::scheduler::{CancelToken, JobPoller, PollerError};

/// Rendering options shared by every job of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub seed: Option<u64>,
    pub output_format: OutputFormat,
    pub output_quality: u8,
}

impl RenderOptions {
    /// Generation input for `prompt` with these options applied
    pub fn input(&self, prompt: impl Into<String>) -> GenerationInput {
        GenerationInput::new(prompt)
            .with_size(self.width, self.height)
            .with_steps(self.num_inference_steps)
            .with_guidance_scale(self.guidance_scale)
            .with_seed(self.seed)
            .with_output_format(self.output_format)
            .with_output_quality(self.output_quality)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        let defaults = GenerationInput::new("");
        Self {
            width: defaults.width,
            height: defaults.height,
            num_inference_steps: defaults.num_inference_steps,
            guidance_scale: defaults.guidance_scale,
            seed: defaults.seed,
            output_format: defaults.output_format,
            output_quality: defaults.output_quality,
        }
    }
}

/// Result of one generation job
#[derive(Debug)]
pub enum GenerationOutcome {
    /// Output downloaded and written to disk
    Saved {
        job_id: String,
        uri: String,
        path: PathBuf,
    },
    /// The job succeeded without producing an output
    EmptyOutput { job_id: String },
    /// The service reported a failure
    GenerationFailed { job_id: String, message: String },
    /// The output was produced but could not be saved
    SaveFailed {
        job_id: String,
        uri: String,
        error: String,
    },
    /// Submission or polling failed
    Aborted(PollerError),
}

impl GenerationOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, GenerationOutcome::Saved { .. })
    }
}

/// Result of a batch over prediction records
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// One entry per job that was started
    pub outcomes: Vec<GenerationOutcome>,
    /// Records skipped for missing or unusable fields
    pub skipped: usize,
    /// Whether the batch stopped because of cancellation
    pub cancelled: bool,
}

/// Runs generation jobs and saves their outputs
pub struct GenerationService {
    poller: JobPoller,
    api: Arc<dyn PredictionApi>,
    model_version: String,
    render: RenderOptions,
    output_dir: PathBuf,
}

impl GenerationService {
    pub fn new(
        poller: JobPoller,
        api: Arc<dyn PredictionApi>,
        model_version: impl Into<String>,
        render: RenderOptions,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            poller,
            api,
            model_version: model_version.into(),
            render,
            output_dir: output_dir.into(),
        }
    }

    /// Builds a validated request for a free-form prompt
    pub fn request_for(&self, prompt: impl Into<String>) -> Result<JobRequest, ValidationError> {
        JobRequest::new(self.model_version.clone(), self.render.input(prompt))
    }

    /// Generates an image for a free-form prompt
    pub async fn generate_prompt(
        &self,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<GenerationOutcome, ValidationError> {
        let request = self.request_for(prompt)?;
        Ok(self.generate(&request, None, cancel).await)
    }

    /// Generates a size-reference image for a dog
    pub async fn generate_size_reference(
        &self,
        subject: &SizeReference,
        cancel: &CancelToken,
    ) -> Result<GenerationOutcome, ValidationError> {
        info!(
            "Generating size reference: {} ({}, {}kg)",
            subject.breed,
            subject.gender,
            subject.weight_label()
        );

        let request = self.request_for(subject.prompt())?;
        let stem = size_reference_stem(subject);
        Ok(self.generate(&request, Some(stem), cancel).await)
    }

    /// Walks prediction records and generates images for at most `max_jobs`
    /// of them
    ///
    /// Records lacking breed, gender or predicted weight are skipped. A job
    /// that fails still counts against `max_jobs`.
    pub async fn generate_for_records(
        &self,
        records: &[PredictionRecord],
        max_jobs: usize,
        cancel: &CancelToken,
    ) -> Result<BatchSummary, ValidationError> {
        let mut summary = BatchSummary::default();

        for (index, record) in records.iter().enumerate() {
            if summary.outcomes.len() >= max_jobs {
                break;
            }

            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let subject = match record.size_reference() {
                Some(Ok(subject)) => subject,
                Some(Err(e)) => {
                    warn!("Skipping record #{}: {}", index, e);
                    summary.skipped += 1;
                    continue;
                }
                None => {
                    summary.skipped += 1;
                    continue;
                }
            };

            let outcome = self.generate_size_reference(&subject, cancel).await?;
            if matches!(outcome, GenerationOutcome::Aborted(PollerError::Cancelled { .. })) {
                summary.cancelled = true;
            }
            summary.outcomes.push(outcome);

            if summary.cancelled {
                break;
            }
        }

        info!(
            "Batch finished: {} job(s), {} record(s) skipped",
            summary.outcomes.len(),
            summary.skipped
        );

        Ok(summary)
    }

    /// Runs one job and saves its output
    ///
    /// The file is named `{stem}.{ext}`, or `generated_{job_id}.{ext}` when
    /// no stem is given.
    pub async fn generate(
        &self,
        request: &JobRequest,
        stem: Option<String>,
        cancel: &CancelToken,
    ) -> GenerationOutcome {
        let (job, outcome) = match self.poller.run(request, cancel).await {
            Ok(result) => result,
            Err(e) => {
                error!("Generation job did not complete: {}", e);
                return GenerationOutcome::Aborted(e);
            }
        };

        let uri = match outcome {
            JobOutcome::Ready(Some(uri)) => uri,
            JobOutcome::Ready(None) => {
                warn!("Job {} succeeded without output", job.id);
                return GenerationOutcome::EmptyOutput { job_id: job.id };
            }
            JobOutcome::Failed(message) => {
                warn!("Job {} failed: {}", job.id, message);
                return GenerationOutcome::GenerationFailed {
                    job_id: job.id,
                    message,
                };
            }
        };

        let stem = stem.unwrap_or_else(|| format!("generated_{}", sanitize(&job.id)));
        let path = self
            .output_dir
            .join(format!("{}.{}", stem, request.input().output_format.extension()));

        match self.save_output(&uri, &path).await {
            Ok(()) => {
                info!("Saved output of job {} to {}", job.id, path.display());
                GenerationOutcome::Saved {
                    job_id: job.id,
                    uri,
                    path,
                }
            }
            Err(e) => {
                error!("Failed to save output of job {}: {}", job.id, e);
                GenerationOutcome::SaveFailed {
                    job_id: job.id,
                    uri,
                    error: e,
                }
            }
        }
    }

    async fn save_output(&self, uri: &str, path: &Path) -> Result<(), String> {
        let bytes = self
            .api
            .download_output(uri)
            .await
            .map_err(|e| e.to_string())?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| format!("cannot create {}: {}", self.output_dir.display(), e))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))
    }
}

/// File stem for a size-reference image
pub fn size_reference_stem(subject: &SizeReference) -> String {
    format!(
        "dog_size_reference_{}_{}kg",
        sanitize(&subject.breed),
        subject.weight_label()
    )
}

/// Replaces characters that are unsafe in file names
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
