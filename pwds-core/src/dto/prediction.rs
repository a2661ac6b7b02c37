//! Prediction DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::{Job, JobStatus};
use crate::domain::request::{GenerationInput, JobRequest};

/// Body of `POST /predictions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrediction {
    pub version: String,
    pub input: GenerationInput,
}

impl From<&JobRequest> for CreatePrediction {
    fn from(request: &JobRequest) -> Self {
        Self {
            version: request.model_version().to_string(),
            input: request.input().clone(),
        }
    }
}

/// Output field of a prediction
///
/// Models report either a list of URIs or a single URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Many(Vec<String>),
    Single(String),
}

impl PredictionOutput {
    /// First non-empty output URI, if any
    pub fn first(&self) -> Option<&str> {
        let uri = match self {
            PredictionOutput::Many(uris) => uris.first().map(String::as_str),
            PredictionOutput::Single(uri) => Some(uri.as_str()),
        };
        uri.filter(|uri| !uri.is_empty())
    }
}

/// Prediction as returned by `POST /predictions` and `GET /predictions/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Prediction {
    /// Error reported by the service, flattened to a message
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

impl From<Prediction> for Job {
    fn from(prediction: Prediction) -> Self {
        let output = prediction
            .output
            .as_ref()
            .and_then(PredictionOutput::first)
            .map(str::to_string);
        let error = prediction.error_message();

        Self {
            id: prediction.id,
            status: prediction.status,
            output,
            error,
            created_at: prediction.created_at,
        }
    }
}
