//! Image encoding: slide image file → base64 `ImageData` for the VLM request.
//!
//! Slide images are already PNG on disk, so the bytes are base64-wrapped as
//! they are rather than decoded and re-encoded. `detail: "high"` instructs
//! GPT-4-class models to use their full tile budget; small chart labels and
//! footnotes are lost at low detail.

use crate::error::GenerationError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use std::path::Path;
use tracing::debug;

/// MIME type for a slide image, from its extension.
pub fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    }
}

/// Read a slide image and wrap it for the VLM API.
pub async fn encode_image_file(path: &Path) -> Result<ImageData, GenerationError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| GenerationError::ImageUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let b64 = STANDARD.encode(&bytes);
    debug!("Encoded {} → {} bytes base64", path.display(), b64.len());

    Ok(ImageData::new(b64, mime_type(path)).with_detail("high"))
}
