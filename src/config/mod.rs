//! Run configuration and API key lookup.

mod secret_store;

use std::path::PathBuf;

pub use secret_store::{
    ChainedSecretStore, EnvSecretStore, FileSecretStore, MemorySecretStore, SecretStore,
    default_secret_store, load_api_key,
};

/// Name of the secret holding the Google API key.
pub const DEFAULT_API_KEY_NAME: &str = "GOOGLE_API_KEY";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";

/// Instruction sent after the uploaded images.
pub const DEFAULT_PROMPT: &str = "Describe what you can see in these images.";

/// Images processed when none are configured.
pub const DEFAULT_IMAGE_PATHS: [&str; 3] = ["./image1.jpg", "./image2.jpg", "./image3.jpg"];

/// Inputs of one run.
///
/// All fields have fixed defaults; the builder methods exist for embedding
/// and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub image_paths: Vec<PathBuf>,
    pub prompt: String,
    pub model: String,
    pub api_key_name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image_paths: DEFAULT_IMAGE_PATHS.iter().map(PathBuf::from).collect(),
            prompt: DEFAULT_PROMPT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_name: DEFAULT_API_KEY_NAME.to_string(),
        }
    }
}

impl RunConfig {
    pub fn image_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.image_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn api_key_name(mut self, name: impl Into<String>) -> Self {
        self.api_key_name = name.into();
        self
    }
}
