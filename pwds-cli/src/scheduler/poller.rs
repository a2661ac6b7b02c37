//! Job poller
//!
//! Submits a generation request and polls the remote job until it reaches a
//! terminal state. Status fetches for a job run strictly one after another.
//! Once a terminal status has been observed the job is never fetched again.

use pwds_client::{ClientError, PredictionApi};
use pwds_core::domain::job::{Job, JobOutcome};
use pwds_core::domain::request::JobRequest;
use pwds_core::dto::prediction::CreatePrediction;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::retry::RetryPolicy;

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between consecutive status fetches
    pub poll_interval: Duration,
    /// Maximum wall-clock time spent polling one job
    pub timeout: Option<Duration>,
    /// Maximum number of status fetches for one job
    pub max_attempts: Option<u32>,
    /// Retry policy for transient API errors
    pub retry: RetryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(300)),
            max_attempts: None,
            retry: RetryPolicy::none(),
        }
    }
}

/// Errors surfaced by the poller
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("Failed to submit generation job: {0}")]
    Submission(#[source] ClientError),

    #[error("Failed to fetch status of job {job_id}: {source}")]
    Poll {
        job_id: String,
        #[source]
        source: ClientError,
    },

    #[error("Job {job_id} did not finish after {attempts} status check(s) in {elapsed:?}")]
    Timeout {
        job_id: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Generation was cancelled")]
    Cancelled { job_id: Option<String> },
}

/// Bookkeeping for one `poll` call
struct PollRun<'a> {
    job_id: &'a str,
    started: Instant,
    deadline: Option<Instant>,
    attempts: u32,
}

impl PollRun<'_> {
    fn timed_out(&self) -> PollerError {
        PollerError::Timeout {
            job_id: self.job_id.to_string(),
            attempts: self.attempts,
            elapsed: self.started.elapsed(),
        }
    }

    fn cancelled(&self) -> PollerError {
        PollerError::Cancelled {
            job_id: Some(self.job_id.to_string()),
        }
    }
}

/// Submits generation jobs and waits for their terminal state
pub struct JobPoller {
    api: Arc<dyn PredictionApi>,
    config: PollerConfig,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(api: Arc<dyn PredictionApi>, config: PollerConfig) -> Self {
        Self { api, config }
    }

    /// Submits a request and polls the resulting job to completion
    ///
    /// Returns the job as first reported by the service together with its
    /// terminal outcome.
    pub async fn run(
        &self,
        request: &JobRequest,
        cancel: &CancelToken,
    ) -> Result<(Job, JobOutcome), PollerError> {
        let job = self.submit(request, cancel).await?;
        let outcome = self.poll(&job, cancel).await?;
        Ok((job, outcome))
    }

    /// Creates the remote job
    ///
    /// Cancelling while the call is in flight abandons the call; the remote
    /// job may still have been created.
    pub async fn submit(
        &self,
        request: &JobRequest,
        cancel: &CancelToken,
    ) -> Result<Job, PollerError> {
        let body = CreatePrediction::from(request);
        let mut retries = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PollerError::Cancelled { job_id: None });
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollerError::Cancelled { job_id: None }),
                result = self.api.create_prediction(&body) => result,
            };

            match result {
                Ok(prediction) => {
                    let job = Job::from(prediction);
                    if job.id.is_empty() {
                        return Err(PollerError::Submission(ClientError::ParseError(
                            "submission response carried no job id".to_string(),
                        )));
                    }

                    info!(job_id = %job.id, status = %job.status, "Submitted generation job");
                    return Ok(job);
                }
                Err(e) if self.config.retry.should_retry_submission(&e, retries) => {
                    retries += 1;
                    let delay = self.config.retry.backoff(retries);
                    warn!(
                        "Submission failed (retry {}/{}): {}. Retrying in {:?}",
                        retries, self.config.retry.max_retries, e, delay
                    );

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(PollerError::Cancelled { job_id: None }),
                        _ = time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(PollerError::Submission(e)),
            }
        }
    }

    /// Polls a job until it reaches a terminal state
    ///
    /// Never returns a non-terminal result. Fails with
    /// [`PollerError::Timeout`] once the configured deadline or attempt count
    /// is exhausted and with [`PollerError::Cancelled`] when `cancel` fires.
    pub async fn poll(&self, job: &Job, cancel: &CancelToken) -> Result<JobOutcome, PollerError> {
        if let Some(outcome) = job.outcome() {
            debug!(job_id = %job.id, status = %job.status, "Job already terminal");
            return Ok(outcome);
        }

        let started = Instant::now();
        let mut run = PollRun {
            job_id: &job.id,
            started,
            deadline: self.config.timeout.map(|timeout| started + timeout),
            attempts: 0,
        };

        loop {
            if cancel.is_cancelled() {
                return Err(run.cancelled());
            }

            run.attempts += 1;
            let current = self.fetch_status(&run, cancel).await?;

            if let Some(outcome) = current.outcome() {
                info!(
                    job_id = %run.job_id,
                    status = %current.status,
                    attempts = run.attempts,
                    "Job reached terminal state"
                );
                return Ok(outcome);
            }

            debug!(
                job_id = %run.job_id,
                status = %current.status,
                attempt = run.attempts,
                "Job still running"
            );

            if self
                .config
                .max_attempts
                .is_some_and(|max| run.attempts >= max)
            {
                warn!(
                    "Giving up on job {} after {} status check(s)",
                    run.job_id, run.attempts
                );
                return Err(run.timed_out());
            }

            self.wait(&run, self.config.poll_interval, cancel).await?;
        }
    }

    /// Fetches the job status once, retrying transient errors per policy
    async fn fetch_status(&self, run: &PollRun<'_>, cancel: &CancelToken) -> Result<Job, PollerError> {
        let mut retries = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(run.cancelled()),
                _ = sleep_until_deadline(run.deadline) => return Err(run.timed_out()),
                result = self.api.get_prediction(run.job_id) => result,
            };

            match result {
                Ok(prediction) => {
                    let mut job = Job::from(prediction);
                    if job.id.is_empty() {
                        job.id = run.job_id.to_string();
                    }
                    return Ok(job);
                }
                Err(e) if self.config.retry.should_retry(&e, retries) => {
                    retries += 1;
                    let delay = self.config.retry.backoff(retries);
                    warn!(
                        "Status check for job {} failed (retry {}/{}): {}. Retrying in {:?}",
                        run.job_id, retries, self.config.retry.max_retries, e, delay
                    );
                    self.wait(run, delay, cancel).await?;
                }
                Err(e) => {
                    return Err(PollerError::Poll {
                        job_id: run.job_id.to_string(),
                        source: e,
                    });
                }
            }
        }
    }

    /// Suspends for `delay`, cut short by cancellation or the deadline
    async fn wait(
        &self,
        run: &PollRun<'_>,
        delay: Duration,
        cancel: &CancelToken,
    ) -> Result<(), PollerError> {
        let wake = Instant::now() + delay;
        let (wake, hits_deadline) = match run.deadline {
            Some(deadline) if deadline <= wake => (deadline, true),
            _ => (wake, false),
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(run.cancelled()),
            _ = time::sleep_until(wake) => {
                if hits_deadline {
                    Err(run.timed_out())
                } else {
                    Ok(())
                }
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
