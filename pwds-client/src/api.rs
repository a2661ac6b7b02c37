//! Prediction API abstraction
//!
//! The poller only needs these three calls. Keeping them behind a trait lets
//! the polling logic run against a scripted service in tests.

use async_trait::async_trait;
use pwds_core::dto::prediction::{CreatePrediction, Prediction};

use crate::PredictionClient;
use crate::error::Result;

/// Operations of a job-based prediction service
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Creates a remote job
    async fn create_prediction(&self, req: &CreatePrediction) -> Result<Prediction>;

    /// Fetches the current state of a remote job
    async fn get_prediction(&self, id: &str) -> Result<Prediction>;

    /// Downloads the bytes behind an output URI
    async fn download_output(&self, uri: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl PredictionApi for PredictionClient {
    async fn create_prediction(&self, req: &CreatePrediction) -> Result<Prediction> {
        PredictionClient::create_prediction(self, req).await
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        PredictionClient::get_prediction(self, id).await
    }

    async fn download_output(&self, uri: &str) -> Result<Vec<u8>> {
        PredictionClient::download_output(self, uri).await
    }
}
