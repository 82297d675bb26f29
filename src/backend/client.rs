use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Handle to a file held by the generative-language file store.
///
/// Deserializes directly from the Gemini `File` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    /// Remote identifier, e.g. `files/abc-123`
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mime_type: String,
    pub uri: String,
    /// `PROCESSING`, `ACTIVE` or `FAILED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Sent by the API as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
}

impl FileHandle {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        uri: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            uri: uri.into(),
            state: None,
            size_bytes: None,
        }
    }
}

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    File(FileHandle),
    Text(String),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }
}

impl From<FileHandle> for ContentPart {
    fn from(handle: FileHandle) -> Self {
        ContentPart::File(handle)
    }
}

/// Returns label descriptions for raw image bytes, in the order the service ranks them.
///
/// An empty vector means the service found nothing. Service-reported errors
/// are returned as `Err`.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn annotate(&self, image: &[u8]) -> Result<Vec<String>>;
}

/// Remote file store of the generative-language service.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Upload `bytes` under `display_name` and return the new handle.
    async fn upload(&self, bytes: Vec<u8>, display_name: &str, mime_type: &str)
    -> Result<FileHandle>;

    /// Fetch an existing file by its remote identifier (`files/...`).
    async fn get(&self, name: &str) -> Result<FileHandle>;
}

/// Generates text from an ordered list of content parts.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String>;
}
