//! The label → upload → verify → describe workflow.
//!
//! Each step is a free function over one of the client traits so it can be
//! driven by the real REST clients or by fakes. [`Pipeline`] strings them
//! together in the fixed order and writes the console report.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::backend::media::{display_name_for_path, mime_type_for_path};
use crate::backend::{
    ContentGenerator, ContentPart, FileHandle, FileStore, GeminiClient, LabelDetector,
    VisionClient,
};
use crate::config::{RunConfig, SecretStore, load_api_key};
use crate::error::{DescriberError, Result};

/// Outcome of label detection for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelDetection {
    /// The service answered; the list may be empty if nothing was recognised.
    Detected(Vec<String>),
    /// Detection did not complete (unreadable file, transport or service error).
    Failed { reason: String },
}

impl LabelDetection {
    /// Labels found, or an empty slice when detection failed.
    pub fn labels(&self) -> &[String] {
        match self {
            LabelDetection::Detected(labels) => labels,
            LabelDetection::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LabelDetection::Failed { .. })
    }
}

async fn read_image(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| DescriberError::io(path, e))
}

/// Detect labels for the image at `path`.
///
/// Never fails: read errors and detector errors are logged and reported as
/// [`LabelDetection::Failed`] so the run can continue with other images.
#[instrument(skip(detector, path), fields(path = %path.display()))]
pub async fn detect_labels(detector: &dyn LabelDetector, path: &Path) -> LabelDetection {
    let result = match read_image(path).await {
        Ok(bytes) => detector.annotate(&bytes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(labels) => {
            debug!(count = labels.len(), "Labels detected");
            LabelDetection::Detected(labels)
        }
        Err(e) => {
            error!(error = %e, "An error occurred during label detection");
            LabelDetection::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Console line for one image, e.g. `Labels for ./image2.jpg: dog, park`.
pub fn format_label_line(path: &Path, labels: &[String]) -> String {
    format!("Labels for {}: {}", path.display(), labels.join(", "))
}

/// Upload every image, in order, under its base name.
///
/// Stops at the first failure.
pub async fn upload_images(store: &dyn FileStore, paths: &[PathBuf]) -> Result<Vec<FileHandle>> {
    let mut uploaded = Vec::with_capacity(paths.len());

    for path in paths {
        let bytes = read_image(path).await?;
        let display_name = display_name_for_path(path);
        let mime_type = mime_type_for_path(path);

        let handle = store.upload(bytes, &display_name, mime_type).await?;
        info!("Uploaded file '{}' as: {}", handle.display_name, handle.uri);
        uploaded.push(handle);
    }

    Ok(uploaded)
}

/// Re-fetch each uploaded file by name to confirm it is retrievable.
pub async fn verify_files(store: &dyn FileStore, handles: &[FileHandle]) -> Result<()> {
    for handle in handles {
        let retrieved = store.get(&handle.name).await?;
        info!(
            "Retrieved file '{}' as: {}",
            retrieved.display_name, retrieved.uri
        );
    }
    Ok(())
}

/// All file handles in order, followed by the instruction text.
pub fn build_prompt_parts(handles: &[FileHandle], text: &str) -> Vec<ContentPart> {
    handles
        .iter()
        .cloned()
        .map(ContentPart::from)
        .chain(std::iter::once(ContentPart::text(text)))
        .collect()
}

/// Ask the model about the uploaded images and return its text unchanged.
pub async fn prompt_with_images(
    generator: &dyn ContentGenerator,
    handles: &[FileHandle],
    text: &str,
) -> Result<String> {
    let parts = build_prompt_parts(handles, text);
    debug!(parts = parts.len(), "Prompting with images");
    generator.generate(&parts).await
}

/// Render text as a Markdown blockquote.
///
/// Empty text still yields a bare `>` so the quote is visible.
pub fn render_blockquote(text: &str) -> String {
    if text.is_empty() {
        return ">".to_string();
    }

    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Paired with the configured image paths, in input order
    pub detections: Vec<(PathBuf, LabelDetection)>,
    pub uploaded: Vec<FileHandle>,
    pub description: String,
}

/// The full workflow over explicitly supplied clients.
pub struct Pipeline<'a> {
    detector: &'a dyn LabelDetector,
    store: &'a dyn FileStore,
    generator: &'a dyn ContentGenerator,
    config: RunConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        detector: &'a dyn LabelDetector,
        store: &'a dyn FileStore,
        generator: &'a dyn ContentGenerator,
        config: RunConfig,
    ) -> Self {
        Self {
            detector,
            store,
            generator,
            config,
        }
    }

    /// Run every step in order, writing label lines and the description to `out`.
    ///
    /// Label detection failures are reported but do not stop the run; any
    /// other failure is returned immediately.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        let paths = &self.config.image_paths;
        info!(images = paths.len(), "Starting run");

        let mut detections = Vec::with_capacity(paths.len());
        for path in paths {
            detections.push((path.clone(), detect_labels(self.detector, path).await));
        }
        for (path, detection) in &detections {
            writeln!(out, "{}", format_label_line(path, detection.labels()))
                .map_err(DescriberError::Output)?;
        }

        let uploaded = upload_images(self.store, paths).await?;
        verify_files(self.store, &uploaded).await?;

        let description = prompt_with_images(self.generator, &uploaded, &self.config.prompt).await?;
        writeln!(out, "{}", render_blockquote(&description)).map_err(DescriberError::Output)?;

        Ok(RunReport {
            detections,
            uploaded,
            description,
        })
    }
}

/// The three remote services a run talks to.
pub struct Services {
    pub detector: Arc<dyn LabelDetector>,
    pub store: Arc<dyn FileStore>,
    pub generator: Arc<dyn ContentGenerator>,
}

impl Services {
    /// Cloud Vision for labels and one Gemini client for files and prompting.
    pub fn google(api_key: String, config: &RunConfig) -> Result<Self> {
        let vision = VisionClient::new(api_key.clone())?;
        let gemini = Arc::new(GeminiClient::new(api_key)?.model(config.model.clone()));

        Ok(Self {
            detector: Arc::new(vision),
            store: gemini.clone(),
            generator: gemini,
        })
    }
}

/// Look up the API key, connect the services and run the workflow.
///
/// The key is resolved before `connect` is called, so a missing key fails
/// with `Config` without any client being built or any request being made.
pub async fn run_with_secrets<W, F>(
    secrets: &dyn SecretStore,
    config: RunConfig,
    connect: F,
    out: &mut W,
) -> Result<RunReport>
where
    W: Write,
    F: FnOnce(String, &RunConfig) -> Result<Services>,
{
    let api_key = load_api_key(secrets, &config.api_key_name)?;
    info!("Gemini API configured successfully");

    let services = connect(api_key, &config)?;
    Pipeline::new(
        services.detector.as_ref(),
        services.store.as_ref(),
        services.generator.as_ref(),
        config,
    )
    .run(out)
    .await
}
