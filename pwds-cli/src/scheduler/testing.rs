//! Scripted prediction service for tests

use async_trait::async_trait;
use pwds_client::{ClientError, PredictionApi, Result};
use pwds_core::domain::job::JobStatus;
use pwds_core::dto::prediction::{CreatePrediction, Prediction, PredictionOutput};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Replays queued responses in order
///
/// A status fetch with nothing left in its queue never completes, which lets
/// tests exercise deadlines and cancellation during an in-flight call.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    submissions: Mutex<VecDeque<Result<Prediction>>>,
    statuses: Mutex<VecDeque<Result<Prediction>>>,
    downloads: Mutex<VecDeque<Result<Vec<u8>>>>,
    submit_calls: AtomicU32,
    fetch_calls: AtomicU32,
    submitted: Mutex<Vec<CreatePrediction>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(self, response: Result<Prediction>) -> Self {
        self.submissions.lock().unwrap().push_back(response);
        self
    }

    pub fn on_status(self, response: Result<Prediction>) -> Self {
        self.statuses.lock().unwrap().push_back(response);
        self
    }

    pub fn on_download(self, response: Result<Vec<u8>>) -> Self {
        self.downloads.lock().unwrap().push_back(response);
        self
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<CreatePrediction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionApi for ScriptedApi {
    async fn create_prediction(&self, req: &CreatePrediction) -> Result<Prediction> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(req.clone());
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api_error(500, "no scripted submission")))
    }

    async fn get_prediction(&self, _id: &str) -> Result<Prediction> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => std::future::pending().await,
        }
    }

    async fn download_output(&self, _uri: &str) -> Result<Vec<u8>> {
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api_error(404, "no scripted download")))
    }
}

pub(crate) fn prediction(id: &str, status: JobStatus) -> Result<Prediction> {
    Ok(Prediction {
        id: id.to_string(),
        status,
        output: None,
        error: None,
        created_at: None,
    })
}

pub(crate) fn succeeded(id: &str, outputs: &[&str]) -> Result<Prediction> {
    Ok(Prediction {
        output: Some(PredictionOutput::Many(
            outputs.iter().map(|o| o.to_string()).collect(),
        )),
        ..prediction(id, JobStatus::Succeeded)?
    })
}

pub(crate) fn failed(id: &str, message: &str) -> Result<Prediction> {
    Ok(Prediction {
        error: Some(serde_json::Value::String(message.to_string())),
        ..prediction(id, JobStatus::Failed)?
    })
}
