//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status string reported by the remote prediction service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    /// Any status this client does not know; polled like a running job
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Lifecycle state this status corresponds to
    pub fn state(self) -> JobState {
        match self {
            JobStatus::Starting => JobState::Submitted,
            JobStatus::Processing | JobStatus::Unknown => JobState::Processing,
            JobStatus::Succeeded => JobState::Succeeded,
            JobStatus::Failed | JobStatus::Canceled => JobState::Failed,
        }
    }

    /// Whether no further transitions can happen from this status
    pub fn is_terminal(self) -> bool {
        self.state().is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a job
///
/// ```text
/// SUBMITTED -> PROCESSING (self-loop while polling) -> SUCCEEDED | FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    Processing,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// Remote image generation job
///
/// Snapshot of what the remote service last reported. A new snapshot replaces
/// the old one on every status fetch; nothing here is updated locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn state(&self) -> JobState {
        self.status.state()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Terminal outcome of the job, or `None` while it is still running
    pub fn outcome(&self) -> Option<JobOutcome> {
        match self.status {
            JobStatus::Starting | JobStatus::Processing | JobStatus::Unknown => None,
            JobStatus::Succeeded => Some(JobOutcome::Ready(self.output.clone())),
            JobStatus::Failed => Some(JobOutcome::Failed(
                self.error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )),
            JobStatus::Canceled => Some(JobOutcome::Failed(
                self.error
                    .clone()
                    .unwrap_or_else(|| "Prediction was canceled".to_string()),
            )),
        }
    }
}

/// How a job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job succeeded. `None` means the service reported no output.
    Ready(Option<String>),
    /// The service reported a failure, with its message
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> Job {
        Job {
            id: "abc123".to_string(),
            status,
            output: None,
            error: None,
            created_at: None,
        }
    }

    #[test]
    fn test_status_states() {
        assert_eq!(JobStatus::Starting.state(), JobState::Submitted);
        assert_eq!(JobStatus::Processing.state(), JobState::Processing);
        assert_eq!(JobStatus::Succeeded.state(), JobState::Succeeded);
        assert_eq!(JobStatus::Failed.state(), JobState::Failed);
        assert_eq!(JobStatus::Canceled.state(), JobState::Failed);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Starting.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        let status: JobStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, JobStatus::Processing);
        assert_eq!(serde_json::to_string(&JobStatus::Canceled).unwrap(), "\"canceled\"");
        assert_eq!(JobStatus::Succeeded.to_string(), "succeeded");
    }

    #[test]
    fn test_unrecognised_status_keeps_polling() {
        let status: JobStatus = serde_json::from_str("\"aborted\"").unwrap();
        assert_eq!(status, JobStatus::Unknown);
        assert_eq!(status.state(), JobState::Processing);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_running_job_has_no_outcome() {
        assert_eq!(job(JobStatus::Starting).outcome(), None);
        assert_eq!(job(JobStatus::Processing).outcome(), None);
        assert_eq!(job(JobStatus::Unknown).outcome(), None);
    }

    #[test]
    fn test_succeeded_outcome() {
        let mut done = job(JobStatus::Succeeded);
        assert_eq!(done.outcome(), Some(JobOutcome::Ready(None)));

        done.output = Some("https://cdn.example/img.png".to_string());
        assert_eq!(
            done.outcome(),
            Some(JobOutcome::Ready(Some("https://cdn.example/img.png".to_string())))
        );
    }

    #[test]
    fn test_failed_outcome_carries_message() {
        let mut failed = job(JobStatus::Failed);
        failed.error = Some("NSFW content detected".to_string());
        assert_eq!(
            failed.outcome(),
            Some(JobOutcome::Failed("NSFW content detected".to_string()))
        );

        assert_eq!(
            job(JobStatus::Failed).outcome(),
            Some(JobOutcome::Failed("Unknown error".to_string()))
        );
        assert_eq!(
            job(JobStatus::Canceled).outcome(),
            Some(JobOutcome::Failed("Prediction was canceled".to_string()))
        );
    }
}
