//! Image URL resolution and download.
//!
//! ComfyUI deployments differ in how generated files are served: the
//! stock `/view` endpoint, a static `/output/` mount, or a reverse
//! proxy exposing `/outputs/`. Candidate URLs are built as an ordered
//! list and tried until one succeeds.

use std::io;
use std::path::{Path, PathBuf};

use crate::api::ComfyUIApi;

/// File name prefix for saved images.
pub const OUTPUT_FILE_PREFIX: &str = "comfyui_";

/// File extension for saved images.
pub const OUTPUT_FILE_EXT: &str = "png";

/// Strip a trailing `/api` segment (and any trailing slash) from the
/// base URL. Image endpoints live on the server root even when the
/// JSON API is mounted under `/api`.
pub fn strip_api_suffix(api_url: &str) -> &str {
    let base = api_url.trim_end_matches('/');
    base.strip_suffix("/api").unwrap_or(base)
}

/// Build the ordered list of candidate download URLs for a filename.
///
/// Tried in order; the first URL answering with a success status wins:
/// 1. `{base}/view?filename={name}&type=output` — stock endpoint
/// 2. `{base}/output/{name}` — static file mount
/// 3. `{base}/outputs/{name}` — common reverse-proxy variant
pub fn candidate_image_urls(api_url: &str, filename: &str) -> Vec<String> {
    let base = strip_api_suffix(api_url);
    vec![
        format!("{base}/view?filename={filename}&type=output"),
        format!("{base}/output/{filename}"),
        format!("{base}/outputs/{filename}"),
    ]
}

/// Try each candidate URL in order and return the first successful
/// response body.
///
/// Returns `None` when every candidate fails; the caller treats the
/// image entry as unusable and keeps scanning. Failures are logged,
/// never propagated.
pub async fn fetch_image(api: &ComfyUIApi, filename: &str) -> Option<Vec<u8>> {
    for url in candidate_image_urls(api.api_url(), filename) {
        tracing::debug!(url = %url, "Attempting image download");
        match api.get_bytes(&url).await {
            Ok(bytes) => {
                tracing::info!(url = %url, size = bytes.len(), "Image downloaded");
                return Some(bytes);
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Image download failed");
            }
        }
    }
    tracing::error!(filename = %filename, "All candidate URLs failed for image");
    None
}

/// Path of the saved image for a prompt inside `output_dir`.
pub fn output_path(output_dir: &Path, prompt_id: &str) -> PathBuf {
    output_dir.join(format!("{OUTPUT_FILE_PREFIX}{prompt_id}.{OUTPUT_FILE_EXT}"))
}

/// Persist downloaded image bytes under `output_dir`.
///
/// The directory is created if absent (idempotent, safe under
/// concurrent calls). The file name is derived from the prompt id, so
/// concurrent generations never collide.
pub fn save_image(output_dir: &Path, prompt_id: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_path(output_dir, prompt_id);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), "Image saved");
    Ok(path)
}
