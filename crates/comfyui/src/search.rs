//! Fail-soft search wrapper for the media-search pipeline.
//!
//! The pipeline treats providers uniformly: a search term in, a list
//! of [`MaterialInfo`] records out. Any failure here (bad template,
//! unreachable server, timeout) is logged and becomes an empty list so
//! the pipeline can fall through to other providers without special
//! error handling.
//!
//! This deliberately conflates "no results" with "request malformed";
//! callers needing the distinction should use
//! [`generate_image`](crate::generate::generate_image) directly.

use clipforge_core::material::MaterialInfo;
use clipforge_core::tasks;

use crate::generate::generate_image;

/// Provider tag recorded on generated materials.
pub const PROVIDER: &str = "comfyui";

/// Nominal duration assigned to still images, in seconds.
pub const DEFAULT_IMAGE_DURATION_SECS: f64 = 5.0;

/// Generate one image for `search_term` and wrap it as search results.
///
/// The output directory is resolved from `task_id` via
/// [`tasks::task_dir`]. An empty API URL or template short-circuits to
/// an empty list without any network call.
pub async fn search_images(
    search_term: &str,
    task_id: &str,
    api_url: &str,
    template: &str,
) -> Vec<MaterialInfo> {
    if api_url.trim().is_empty() || template.trim().is_empty() {
        tracing::error!("ComfyUI API URL or workflow template not provided");
        return Vec::new();
    }

    let output_dir = match tasks::task_dir(task_id) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!(task_id = %task_id, error = %e, "Failed to resolve task directory");
            return Vec::new();
        }
    };

    match generate_image(search_term, api_url, template, &output_dir).await {
        Ok(path) => {
            vec![MaterialInfo::local(
                PROVIDER,
                path.to_string_lossy().into_owned(),
                DEFAULT_IMAGE_DURATION_SECS,
            )]
        }
        Err(e) => {
            tracing::error!(
                search_term = %search_term,
                task_id = %task_id,
                error = %e,
                "Image generation failed",
            );
            Vec::new()
        }
    }
}
