pub mod client;
pub mod gemini;
pub mod media;
pub mod utils;
pub mod vision;

pub use client::{ContentGenerator, ContentPart, FileHandle, FileStore, LabelDetector};
pub use gemini::{GeminiClient, GeminiConfig};
pub use utils::{check_response_status, handle_http_error};
pub use vision::{VisionClient, VisionConfig};
