use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::backend::client::{ContentGenerator, ContentPart, FileHandle, FileStore};
use crate::backend::{check_response_status, handle_http_error};
use crate::config::DEFAULT_MODEL;
use crate::error::{DescriberError, Result};

/// Default Gemini REST endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default endpoint for media uploads to the Files API.
pub const GEMINI_UPLOAD_BASE_URL: &str = "https://generativelanguage.googleapis.com/upload/v1beta";

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model identifier, e.g. `gemini-1.5-pro-latest`
    pub model: String,
    pub timeout: Option<Duration>,
    /// Defaults to [`GEMINI_BASE_URL`] if not set
    pub base_url: Option<String>,
    /// Defaults to [`GEMINI_UPLOAD_BASE_URL`] if not set
    pub upload_base_url: Option<String>,
}

/// Gemini client covering the Files API and `generateContent`.
///
/// One value is built per run and passed to each step; it holds no
/// process-wide state.
///
/// # Examples
///
/// ```no_run
/// # use image_describer::GeminiClient;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::new("your-api-key")?.model("gemini-1.5-pro-latest");
/// # Ok(())
/// # }
/// ```
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

// Request bodies

#[derive(Debug, Serialize)]
struct StartUploadRequest<'a> {
    file: UploadMetadata<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadMetadata<'a> {
    display_name: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

// Response bodies

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileHandle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl From<&ContentPart> for Part {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::File(handle) => Part::File {
                file_data: FileData {
                    mime_type: handle.mime_type.clone(),
                    file_uri: handle.uri.clone(),
                },
            },
            ContentPart::Text(text) => Part::Text { text: text.clone() },
        }
    }
}

impl GeminiClient {
    /// Create a new Gemini client with the provided API key.
    ///
    /// The model defaults to [`DEFAULT_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns `Config` if the key is empty.
    #[instrument(name = "gemini_client_new", skip(api_key))]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DescriberError::Config(
                "Gemini API key cannot be empty".to_string(),
            ));
        }

        let config = GeminiConfig {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            base_url: None,
            upload_base_url: None,
        };

        info!(model = %config.model, "Created Gemini client");

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Set the model to use
    #[instrument(skip(self, model))]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        debug!(
            previous_model = %self.config.model,
            new_model = %model,
            "Setting Gemini model"
        );
        self.config.model = model;
        self
    }

    /// Set a custom base URL for media uploads (without trailing slash).
    pub fn upload_base_url(mut self, upload_base_url: impl Into<String>) -> Self {
        self.config.upload_base_url = Some(upload_base_url.into());
        self
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    fn api_base(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(GEMINI_BASE_URL)
    }

    fn upload_base(&self) -> &str {
        self.config
            .upload_base_url
            .as_deref()
            .unwrap_or(GEMINI_UPLOAD_BASE_URL)
    }

    fn build_generate_request(parts: &[ContentPart]) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: parts.iter().map(Part::from).collect(),
            }],
        }
    }

    /// Open a resumable upload session and return its URL.
    async fn start_upload(&self, len: usize, display_name: &str, mime_type: &str) -> Result<String> {
        let url = format!("{}/files", self.upload_base());
        debug!(url = %url, "Starting resumable upload");

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.config.api_key)])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", len.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUploadRequest {
                file: UploadMetadata { display_name },
            })
            .send()
            .await
            .map_err(|e| handle_http_error(e, "Gemini"))?;

        let response = check_response_status(response, "Gemini").await?;

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                error!("Upload start response is missing the upload URL header");
                DescriberError::ApiError(format!(
                    "Gemini API did not return an {} header",
                    UPLOAD_URL_HEADER
                ))
            })
    }
}

crate::impl_client_builder_methods! {
    client_type: GeminiClient,
    provider_name: "Gemini"
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            error!(block_reason = %reason, "Gemini blocked the prompt");
            return Err(DescriberError::ApiError(format!(
                "Prompt was blocked: {}",
                reason
            )));
        }
        error!("Gemini API returned empty candidates array");
        return Err(DescriberError::ApiError(
            "No completion candidates returned".to_string(),
        ));
    };

    trace!(finish_reason = ?candidate.finish_reason, "Completion finish reason");

    let texts: Vec<String> = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if texts.is_empty() {
        error!(finish_reason = ?candidate.finish_reason, "No text content in Gemini response");
        return Err(DescriberError::ApiError(format!(
            "No text content in response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(texts.concat())
}

#[async_trait]
impl FileStore for GeminiClient {
    #[instrument(
        name = "gemini_upload",
        skip(self, bytes),
        fields(len = bytes.len())
    )]
    async fn upload(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileHandle> {
        let session_url = self
            .start_upload(bytes.len(), display_name, mime_type)
            .await?;
        debug!("Upload session opened, sending bytes");

        let response = self
            .client
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| handle_http_error(e, "Gemini"))?;

        let response = check_response_status(response, "Gemini").await?;

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse upload response from Gemini API");
            e
        })?;

        if uploaded.file.state.as_deref() == Some("FAILED") {
            warn!(name = %uploaded.file.name, "Uploaded file is in FAILED state");
        }

        Ok(uploaded.file)
    }

    #[instrument(name = "gemini_get_file", skip(self))]
    async fn get(&self, name: &str) -> Result<FileHandle> {
        let url = format!("{}/{}", self.api_base(), name);
        debug!(url = %url, "Fetching file metadata");

        let response = self
            .client
            .get(&url)
            .query(&[("key", &self.config.api_key)])
            .send()
            .await
            .map_err(|e| handle_http_error(e, "Gemini"))?;

        let response = check_response_status(response, "Gemini").await?;

        let file: FileHandle = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse file metadata from Gemini API");
            e
        })?;
        Ok(file)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    #[instrument(
        name = "gemini_generate",
        skip(self, parts),
        fields(model = %self.config.model, parts = parts.len())
    )]
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        let request = Self::build_generate_request(parts);

        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base(),
            self.config.model
        );
        debug!(url = %url, "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.config.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| handle_http_error(e, "Gemini"))?;

        let response = check_response_status(response, "Gemini").await?;

        debug!("Successfully received response from Gemini API");
        let completion: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse JSON response from Gemini API");
            e
        })?;

        let text = extract_text(completion)?;
        debug!(content_len = text.len(), "Extracted text from response");
        Ok(text)
    }
}
