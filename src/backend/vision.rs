use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace};

use crate::backend::client::LabelDetector;
use crate::backend::media::encode_base64;
use crate::backend::{check_response_status, handle_http_error};
use crate::error::{DescriberError, Result};

/// Default Cloud Vision REST endpoint.
pub const VISION_BASE_URL: &str = "https://vision.googleapis.com/v1";

const ERROR_DOCS_HINT: &str =
    "For more info on error messages, check: https://cloud.google.com/apis/design/errors";

/// Configuration for the Cloud Vision client
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    /// Maximum labels per image; the service default applies when unset
    pub max_results: Option<u32>,
    pub timeout: Option<Duration>,
    /// Defaults to [`VISION_BASE_URL`] if not set
    pub base_url: Option<String>,
}

/// Cloud Vision client performing `LABEL_DETECTION` on inline image bytes.
pub struct VisionClient {
    config: VisionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct Image {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

impl VisionClient {
    /// Create a new Cloud Vision client authenticated with an API key.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the key is empty.
    #[instrument(name = "vision_client_new", skip(api_key))]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DescriberError::Config(
                "Vision API key cannot be empty".to_string(),
            ));
        }

        let config = VisionConfig {
            api_key,
            max_results: None,
            timeout: None,
            base_url: None,
        };

        info!("Created Cloud Vision client");

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Limit the number of labels returned per image.
    pub fn max_results(mut self, max: u32) -> Self {
        self.config.max_results = Some(max.max(1));
        self
    }

    fn build_request(&self, image: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    content: encode_base64(image),
                },
                features: vec![Feature {
                    kind: "LABEL_DETECTION",
                    max_results: self.config.max_results,
                }],
            }],
        }
    }
}

crate::impl_client_builder_methods! {
    client_type: VisionClient,
    provider_name: "Vision"
}

/// Pull label descriptions out of an annotate response.
///
/// A non-empty error message on the per-image response wins over any labels.
fn extract_labels(response: AnnotateResponse) -> Result<Vec<String>> {
    let Some(first) = response.responses.into_iter().next() else {
        debug!("Vision API returned no per-image responses");
        return Ok(Vec::new());
    };

    if let Some(status) = first.error.filter(|s| !s.message.is_empty()) {
        error!(code = ?status.code, message = %status.message, "Error in response");
        return Err(DescriberError::Annotation(format!(
            "{}\n{}",
            status.message, ERROR_DOCS_HINT
        )));
    }

    for label in &first.label_annotations {
        trace!(label = %label.description, score = ?label.score, "Label annotation");
    }

    Ok(first
        .label_annotations
        .into_iter()
        .map(|label| label.description)
        .collect())
}

#[async_trait]
impl LabelDetector for VisionClient {
    #[instrument(name = "vision_annotate", skip(self, image), fields(image_len = image.len()))]
    async fn annotate(&self, image: &[u8]) -> Result<Vec<String>> {
        let request = self.build_request(image);

        let base_url = self.config.base_url.as_deref().unwrap_or(VISION_BASE_URL);
        let url = format!("{}/images:annotate", base_url);
        debug!(url = %url, "Sending request to Vision API");

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.config.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| handle_http_error(e, "Vision"))?;

        let response = check_response_status(response, "Vision").await?;

        let body: AnnotateResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse JSON response from Vision API");
            e
        })?;

        let labels = extract_labels(body)?;
        debug!(count = labels.len(), "Received labels");
        Ok(labels)
    }
}
