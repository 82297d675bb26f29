//! image-describer: label local images with Cloud Vision, then have Gemini describe them.
//!
//! # Overview
//!
//! A run has four steps, executed strictly in order:
//!
//! 1. Look up the API key in a [`SecretStore`] and build the clients.
//! 2. Detect labels for each image ([`VisionClient`]); failures are logged and
//!    reported as [`LabelDetection::Failed`] without stopping the run.
//! 3. Upload each image to the Gemini Files API and re-fetch it by name.
//! 4. Ask the model to describe the uploaded images and print the answer.
//!
//! Every remote service sits behind a trait ([`LabelDetector`], [`FileStore`],
//! [`ContentGenerator`]) so the steps can be driven by fakes.
//!
//! # Quick Start
//!
//! ```no_run
//! use image_describer::{
//!     EnvSecretStore, GeminiClient, Pipeline, RunConfig, VisionClient, load_api_key,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::default();
//!     let api_key = load_api_key(&EnvSecretStore, &config.api_key_name)?;
//!
//!     let vision = VisionClient::new(api_key.clone())?;
//!     let gemini = GeminiClient::new(api_key)?.model(config.model.clone());
//!
//!     let pipeline = Pipeline::new(&vision, &gemini, &gemini, config);
//!     pipeline.run(&mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

mod backend;
mod error;
pub mod config;
pub mod pipeline;
#[cfg(feature = "logging")]
pub mod logging;

// Re-exports for convenience
pub use error::{DescriberError, Result};
pub use config::{
    ChainedSecretStore, EnvSecretStore, FileSecretStore, MemorySecretStore, RunConfig,
    SecretStore, default_secret_store, load_api_key,
};
pub use pipeline::{
    LabelDetection, Pipeline, RunReport, Services, build_prompt_parts, detect_labels,
    format_label_line, prompt_with_images, render_blockquote, run_with_secrets, upload_images,
    verify_files,
};

pub use backend::media::{display_name_for_path, mime_type_for_path};
pub use backend::{
    ContentGenerator, ContentPart, FileHandle, FileStore, GeminiClient, GeminiConfig,
    LabelDetector, VisionClient, VisionConfig,
};
