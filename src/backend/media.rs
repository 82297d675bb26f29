use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// MIME type used when the extension is not a known image type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Guess an image MIME type from the file extension (case-insensitive).
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("bmp") => "image/bmp",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Display name for an uploaded file: the path's final component.
///
/// Falls back to the whole path when there is no file name (e.g. `..`).
pub fn display_name_for_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
