//! In-memory fakes for the three remote services.

pub mod http;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use image_describer::{
    ContentGenerator, ContentPart, DescriberError, FileHandle, FileStore, LabelDetector, Result,
};

/// Answers label requests by looking up the exact image bytes.
#[derive(Default)]
pub struct FakeDetector {
    responses: HashMap<Vec<u8>, std::result::Result<Vec<String>, String>>,
    calls: Mutex<Vec<Vec<u8>>>,
}

#[allow(dead_code)]
impl FakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(mut self, image: &[u8], labels: &[&str]) -> Self {
        self.responses.insert(
            image.to_vec(),
            Ok(labels.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    pub fn service_error(mut self, image: &[u8], message: &str) -> Self {
        self.responses.insert(image.to_vec(), Err(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LabelDetector for FakeDetector {
    async fn annotate(&self, image: &[u8]) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(image.to_vec());
        match self.responses.get(image) {
            Some(Ok(labels)) => Ok(labels.clone()),
            Some(Err(message)) => Err(DescriberError::Annotation(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Records uploads and lookups; hands out sequential `files/N` names.
#[derive(Default)]
pub struct FakeFileStore {
    uploads: Mutex<Vec<(String, String, usize)>>,
    gets: Mutex<Vec<String>>,
    fail_upload_of: Option<String>,
}

#[allow(dead_code)]
impl FakeFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_upload(mut self, display_name: &str) -> Self {
        self.fail_upload_of = Some(display_name.to_string());
        self
    }

    /// (display name, mime type, byte count) per upload, in call order
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.uploads.lock().unwrap().len() + self.gets.lock().unwrap().len()
    }
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileHandle> {
        if self.fail_upload_of.as_deref() == Some(display_name) {
            return Err(DescriberError::ApiError(format!(
                "upload of {} rejected",
                display_name
            )));
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((display_name.to_string(), mime_type.to_string(), bytes.len()));
        let id = uploads.len();
        Ok(FileHandle::new(
            format!("files/{}", id),
            display_name,
            format!("https://files.example.com/v1beta/files/{}", id),
            mime_type,
        ))
    }

    async fn get(&self, name: &str) -> Result<FileHandle> {
        self.gets.lock().unwrap().push(name.to_string());
        let uploads = self.uploads.lock().unwrap();
        let index: usize = name
            .strip_prefix("files/")
            .and_then(|id| id.parse().ok())
            .filter(|&id| id >= 1 && id <= uploads.len())
            .ok_or_else(|| DescriberError::ApiError(format!("{} not found", name)))?;
        let (display_name, mime_type, _) = &uploads[index - 1];
        Ok(FileHandle::new(
            name,
            display_name.clone(),
            format!("https://files.example.com/v1beta/{}", name),
            mime_type.clone(),
        ))
    }
}

/// Returns a canned answer and keeps the parts it was sent.
pub struct FakeGenerator {
    reply: String,
    requests: Mutex<Vec<Vec<ContentPart>>>,
}

#[allow(dead_code)]
impl FakeGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ContentPart>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        self.requests.lock().unwrap().push(parts.to_vec());
        Ok(self.reply.clone())
    }
}

/// Write `contents` to `dir/name` and return the path.
#[allow(dead_code)]
pub fn write_image(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write image fixture");
    path
}
