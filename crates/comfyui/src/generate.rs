//! Single-image generation: substitute, submit, poll, save.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::api::ComfyUIApi;
use crate::download;
use crate::poll::{poll_for_image, PollConfig};
use crate::workflow;

/// Terminal failures of a generation call.
///
/// Transient poll and download failures are not represented here; they
/// are logged and retried inside the polling loop.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The template did not produce valid JSON after substitution.
    /// Raised before any network call.
    #[error("Invalid workflow template: {0}")]
    InvalidTemplate(#[source] serde_json::Error),

    /// The enqueue request failed (network error or non-2xx status).
    /// Never retried.
    #[error("Failed to queue prompt: {0}")]
    SubmissionFailed(String),

    /// The enqueue response carried no `prompt_id`.
    #[error("No prompt_id returned from ComfyUI")]
    MissingJobId,

    /// Attempt budget exhausted with an idle server queue.
    #[error("Timed out waiting for image generation after {attempts} attempts")]
    Timeout {
        /// Number of poll attempts made.
        attempts: u32,
    },

    /// Attempt budget exhausted while the server still reports queued
    /// work; the image may yet be generated out-of-band.
    #[error(
        "Timed out waiting for image generation; ComfyUI is still processing: \
         {running} running, {pending} pending"
    )]
    StillProcessing {
        /// Jobs currently executing.
        running: i64,
        /// Jobs waiting in the queue.
        pending: i64,
    },

    /// The cancellation token fired during polling.
    #[error("Image generation cancelled")]
    Cancelled,

    /// Writing the downloaded image to disk failed.
    #[error("Failed to save image: {0}")]
    Io(#[from] std::io::Error),
}

/// Generate one image and save it under `output_dir`.
///
/// Uses the default [`PollConfig`] and no cancellation. See
/// [`generate_image_with`] for the full contract.
pub async fn generate_image(
    prompt: &str,
    api_url: &str,
    template: &str,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    generate_image_with(
        prompt,
        api_url,
        template,
        output_dir,
        &PollConfig::default(),
        &CancellationToken::new(),
    )
    .await
}

/// Generate one image and save it under `output_dir`.
///
/// Flow: substitute the prompt into the template, submit the workflow
/// with a fresh client id, poll history until the prompt completes and
/// an image downloads, then write `comfyui_<prompt_id>.png` into
/// `output_dir` and return its path. The first successfully downloaded
/// image terminates the operation even when the job produced several.
///
/// The call blocks its task for up to `config.max_attempts` intervals
/// plus network latencies; run it off the hot path. `cancel` is
/// checked once per poll iteration and during the sleep.
pub async fn generate_image_with(
    prompt: &str,
    api_url: &str,
    template: &str,
    output_dir: &Path,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<PathBuf, GenerateError> {
    let workflow =
        workflow::substitute_prompt(template, prompt).map_err(GenerateError::InvalidTemplate)?;

    let api = ComfyUIApi::new(api_url.to_string());
    let client_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(api_url = %api_url, client_id = %client_id, "Submitting workflow to ComfyUI");

    let response = api
        .submit_workflow(&workflow, &client_id)
        .await
        .map_err(|e| GenerateError::SubmissionFailed(e.to_string()))?;

    let prompt_id = match response.prompt_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(GenerateError::MissingJobId),
    };

    tracing::info!(prompt_id = %prompt_id, "Prompt queued");

    let bytes = poll_for_image(&api, &prompt_id, config, cancel).await?;
    let path = download::save_image(output_dir, &prompt_id, &bytes)?;

    tracing::info!(prompt_id = %prompt_id, path = %path.display(), "Image generated");
    Ok(path)
}
