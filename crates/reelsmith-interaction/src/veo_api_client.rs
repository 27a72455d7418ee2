//! VeoApiClient - REST implementation of [`RemoteGenerationClient`] for Veo.
//!
//! Talks to the Generative Language API:
//!
//! - submit: `POST {base}/models/{model}:predictLongRunning`
//! - poll:   `GET  {base}/{operation_name}`
//! - fetch:  `GET  {artifact_uri}`
//!
//! The key is sent in the `x-goog-api-key` header on every call.

use async_trait::async_trait;
use reelsmith_core::config::{ApiConfig, DEFAULT_API_BASE_URL};
use reelsmith_core::generation::{
    ArtifactRef, GenerationRequest, RemoteGenerationClient, RemoteOperation,
};
use reelsmith_core::{ReelError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Veo long-running video generation API.
#[derive(Clone)]
pub struct VeoApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for VeoApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VeoApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl VeoApiClient {
    /// Creates a client for the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ReelError::Configuration` for a blank key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ReelError::configuration("API key must not be empty"));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_API_BASE_URL.to_string(),
        })
    }

    pub fn from_config(api_key: impl Into<String>, config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(api_key)?.with_base_url(&config.base_url))
    }

    /// Overrides the API root, e.g. for a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|err| ReelError::Remote {
                status_code: None,
                message: format!("{what} request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Failed to read {what} error body"));
            return Err(map_http_error(status, body_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteGenerationClient for VeoApiClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<RemoteOperation> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url,
            request.model.model_id()
        );
        let body = PredictRequest::from(request);

        tracing::debug!(model = request.model.model_id(), aspect_ratio = %request.aspect_ratio, "Submitting generation");
        let response = self.send(self.client.post(url).json(&body), "Submit").await?;
        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|err| ReelError::submission(format!("Failed to parse submit response: {err}")))?;

        Ok(operation.into_remote())
    }

    async fn poll(&self, operation: &RemoteOperation) -> Result<RemoteOperation> {
        let url = format!("{}/{}", self.base_url, operation.name);
        let response = self.send(self.client.get(url), "Poll").await?;
        let parsed: OperationResponse = response.json().await.map_err(|err| ReelError::Remote {
            status_code: None,
            message: format!("Failed to parse operation status: {err}"),
            is_retryable: false,
        })?;

        Ok(parsed.into_remote())
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        let response = self
            .send(self.client.get(&artifact.uri), "Download")
            .await
            .map_err(|e| ReelError::download(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ReelError::download(format!("Failed to read artifact body: {err}")))?;

        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Instance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImagePayload>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagePayload {
    gcs_uri: String,
    mime_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    aspect_ratio: String,
    sample_count: u32,
}

impl From<&GenerationRequest> for PredictRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            instances: vec![Instance {
                prompt: request.prompt.clone(),
                image: request.image.as_ref().map(|image| ImagePayload {
                    gcs_uri: image.uri.clone(),
                    mime_type: image.mime_type.to_string(),
                }),
            }],
            parameters: Parameters {
                aspect_ratio: request.aspect_ratio.to_string(),
                sample_count: request.variation_count,
            },
        }
    }
}

#[derive(Deserialize)]
struct OperationResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResult>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoPayload {
    uri: Option<String>,
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

impl ErrorBody {
    fn describe(self, fallback: &str) -> String {
        let status_text = self.status.unwrap_or_default();
        let msg = self.message.unwrap_or_else(|| fallback.to_string());
        if status_text.is_empty() {
            msg
        } else {
            format!("{status_text}: {msg}")
        }
    }
}

impl OperationResponse {
    /// Maps the wire operation onto the service-neutral handle.
    ///
    /// A finished operation without an artifact or error keeps `outcome`
    /// empty; the orchestrator records that as a failure.
    fn into_remote(self) -> RemoteOperation {
        if !self.done {
            return RemoteOperation::pending(self.name);
        }

        if let Some(error) = self.error {
            return RemoteOperation::failed(self.name, error.describe("Operation failed"));
        }

        let Some(video_response) = self.response.and_then(|r| r.generate_video_response) else {
            return RemoteOperation {
                name: self.name,
                done: true,
                outcome: None,
            };
        };

        let artifact = video_response
            .generated_samples
            .into_iter()
            .filter_map(|sample| sample.video)
            .find_map(|video| {
                video.uri.map(|uri| ArtifactRef {
                    uri,
                    mime_type: video.mime_type,
                })
            });

        match artifact {
            Some(artifact) => RemoteOperation::succeeded(self.name, artifact),
            None if !video_response.rai_media_filtered_reasons.is_empty() => RemoteOperation::failed(
                self.name,
                format!(
                    "Blocked by content filter: {}",
                    video_response.rai_media_filtered_reasons.join("; ")
                ),
            ),
            None => RemoteOperation {
                name: self.name,
                done: true,
                outcome: None,
            },
        }
    }
}

fn map_http_error(status: StatusCode, body: String) -> ReelError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| wrapper.error.describe(&body))
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ReelError::Remote {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_core::generation::OperationOutcome;
    use reelsmith_core::settings::{
        AspectRatio, GenerationSettings, ImageMimeType, ImageReference, ModelVersion,
    };

    fn parse(json: &str) -> RemoteOperation {
        serde_json::from_str::<OperationResponse>(json)
            .unwrap()
            .into_remote()
    }

    #[test]
    fn request_body_matches_wire_format() {
        let settings = GenerationSettings::new(AspectRatio::Portrait, ModelVersion::Veo3Fast, 3)
            .with_image(Some(ImageReference {
                uri: "gs://bucket/start.jpg".to_string(),
                mime_type: ImageMimeType::Jpeg,
            }));
        let request = GenerationRequest::single("a paper boat", &settings);

        let body = serde_json::to_value(PredictRequest::from(&request)).unwrap();
        assert_eq!(body["instances"][0]["prompt"], "a paper boat");
        assert_eq!(body["instances"][0]["image"]["gcsUri"], "gs://bucket/start.jpg");
        assert_eq!(body["instances"][0]["image"]["mimeType"], "image/jpeg");
        assert_eq!(body["parameters"]["aspectRatio"], "9:16");
        assert_eq!(body["parameters"]["sampleCount"], 1);
    }

    #[test]
    fn request_without_image_omits_field() {
        let settings = GenerationSettings::new(AspectRatio::Widescreen, ModelVersion::Veo3Quality, 1);
        let body =
            serde_json::to_value(PredictRequest::from(&GenerationRequest::single("x", &settings)))
                .unwrap();
        assert!(body["instances"][0].get("image").is_none());
    }

    #[test]
    fn pending_operation() {
        let op = parse(r#"{"name": "models/veo/operations/abc"}"#);
        assert_eq!(op, RemoteOperation::pending("models/veo/operations/abc"));
    }

    #[test]
    fn finished_operation_with_sample() {
        let op = parse(
            r#"{
                "name": "models/veo/operations/abc",
                "done": true,
                "response": {
                    "@type": "type.googleapis.com/google.ai.generativelanguage.v1beta.PredictLongRunningResponse",
                    "generateVideoResponse": {
                        "generatedSamples": [
                            {"video": {"uri": "https://example.test/files/abc:download?alt=media"}}
                        ]
                    }
                }
            }"#,
        );
        assert!(op.done);
        match op.outcome {
            Some(OperationOutcome::Artifact(artifact)) => {
                assert_eq!(artifact.uri, "https://example.test/files/abc:download?alt=media");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn finished_operation_with_error() {
        let op = parse(
            r#"{"name": "op", "done": true, "error": {"code": 3, "message": "prompt rejected", "status": "INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(
            op.outcome,
            Some(OperationOutcome::Error("INVALID_ARGUMENT: prompt rejected".to_string()))
        );
    }

    #[test]
    fn filtered_operation_is_error() {
        let op = parse(
            r#"{"name": "op", "done": true, "response": {"generateVideoResponse": {"raiMediaFilteredReasons": ["unsafe content"]}}}"#,
        );
        assert!(matches!(op.outcome, Some(OperationOutcome::Error(msg)) if msg.contains("unsafe content")));
    }

    #[test]
    fn finished_operation_without_result_has_no_outcome() {
        let op = parse(r#"{"name": "op", "done": true, "response": {}}"#);
        assert!(op.done);
        assert!(op.outcome.is_none());
    }

    #[test]
    fn http_errors_classify_retryability() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#.to_string(),
        );
        assert!(err.is_retryable());
        assert!(err.to_string().contains("RESOURCE_EXHAUSTED: quota"));

        let err = map_http_error(StatusCode::BAD_REQUEST, "plain text".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Remote service error (400): plain text");
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(VeoApiClient::new("  ").unwrap_err().is_configuration());
        let client = VeoApiClient::new("k").unwrap().with_base_url("http://localhost:9/v1/");
        assert_eq!(client.base_url, "http://localhost:9/v1");
        assert!(!format!("{client:?}").contains("\"k\""));
    }
}
