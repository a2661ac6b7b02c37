//! Prediction API endpoints

use crate::PredictionClient;
use crate::error::{ClientError, Result};
use pwds_core::dto::prediction::{CreatePrediction, Prediction};
use reqwest::Method;
use tracing::debug;

impl PredictionClient {
    // =============================================================================
    // Prediction Lifecycle
    // =============================================================================

    /// Create a new prediction (remote generation job)
    ///
    /// # Arguments
    /// * `req` - The prediction creation request
    ///
    /// # Returns
    /// The created prediction, usually in `starting` state
    pub async fn create_prediction(&self, req: &CreatePrediction) -> Result<Prediction> {
        let url = format!("{}/predictions", self.base_url);
        debug!(model = %req.version, "Creating prediction");

        let response = self.request(Method::POST, &url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the current state of a prediction
    ///
    /// # Arguments
    /// * `id` - The prediction ID assigned by the service
    pub async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        validate_id(id)?;

        let url = format!("{}/predictions/{}", self.base_url, id);
        let response = self.request(Method::GET, &url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Outputs
    // =============================================================================

    /// Download a generated output
    ///
    /// Output URIs point at a CDN, so no credentials are attached.
    ///
    /// # Arguments
    /// * `uri` - Absolute URI taken from a succeeded prediction
    pub async fn download_output(&self, uri: &str) -> Result<Vec<u8>> {
        if !uri.starts_with("http://") && !uri.starts_with("https://") {
            return Err(ClientError::InvalidRequest(format!(
                "output URI must be absolute http(s): {}",
                uri
            )));
        }

        let response = self.client.get(uri).send().await?;

        self.handle_bytes_response(response).await
    }
}

/// Prediction IDs are opaque but must form a single path segment
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ClientError::InvalidRequest(format!(
            "invalid prediction id: {:?}",
            id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pwds_core::domain::job::JobStatus;
    use pwds_core::domain::request::{GenerationInput, JobRequest};
    use serde_json::json;

    fn create_request() -> CreatePrediction {
        let request = JobRequest::new(
            "black-forest-labs/flux-1.1-pro",
            GenerationInput::new("a dog"),
        )
        .unwrap();
        CreatePrediction::from(&request)
    }

    #[tokio::test]
    async fn test_create_prediction() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/predictions")
                    .header("authorization", "Bearer test-token")
                    .body_contains("\"version\":\"black-forest-labs/flux-1.1-pro\"")
                    .body_contains("\"prompt\":\"a dog\"");
                then.status(201)
                    .json_body(json!({"id": "abc123", "status": "starting"}));
            })
            .await;

        let client = PredictionClient::new(server.base_url()).with_token("test-token");
        let prediction = client.create_prediction(&create_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(prediction.id, "abc123");
        assert_eq!(prediction.status, JobStatus::Starting);
    }

    #[tokio::test]
    async fn test_create_prediction_rejected() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/predictions");
                then.status(422).body("invalid version");
            })
            .await;

        let client = PredictionClient::new(server.base_url());
        let err = client.create_prediction(&create_request()).await.unwrap_err();

        assert!(err.is_client_error());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("invalid version"));
    }

    #[tokio::test]
    async fn test_get_prediction() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions/abc123");
                then.status(200).json_body(json!({
                    "id": "abc123",
                    "status": "succeeded",
                    "output": ["https://cdn.example/img.png"],
                    "error": null
                }));
            })
            .await;

        let client = PredictionClient::new(server.base_url());
        let prediction = client.get_prediction("abc123").await.unwrap();

        assert_eq!(prediction.status, JobStatus::Succeeded);
        assert_eq!(
            prediction.output.as_ref().and_then(|o| o.first()),
            Some("https://cdn.example/img.png")
        );
    }

    #[tokio::test]
    async fn test_get_prediction_server_error() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions/abc123");
                then.status(500).body("Internal Server Error");
            })
            .await;

        let client = PredictionClient::new(server.base_url());
        let err = client.get_prediction("abc123").await.unwrap_err();

        assert_eq!(mock.hits_async().await, 1);
        assert!(err.is_server_error());
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_get_prediction_invalid_json() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/predictions/abc123");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("not valid json");
            })
            .await;

        let client = PredictionClient::new(server.base_url());
        let err = client.get_prediction("abc123").await.unwrap_err();

        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_get_prediction_rejects_bad_id() {
        let client = PredictionClient::new("http://localhost:1");

        for id in ["", "a/b", "a?b"] {
            let err = client.get_prediction(id).await.unwrap_err();
            assert!(matches!(err, ClientError::InvalidRequest(_)));
        }
    }

    #[tokio::test]
    async fn test_download_output() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/img.png");
                then.status(200).body(vec![0x89, b'P', b'N', b'G']);
            })
            .await;

        let client = PredictionClient::new("http://unused.invalid").with_token("secret");
        let bytes = client
            .download_output(&server.url("/img.png"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_download_output_rejects_relative_uri() {
        let client = PredictionClient::new("http://localhost:1");
        let err = client.download_output("img.png").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
