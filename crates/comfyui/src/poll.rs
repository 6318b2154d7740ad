//! History polling loop.
//!
//! After a workflow is queued, the server is polled at a fixed
//! interval until the prompt shows up in the history with
//! `status.completed == true` and a downloadable image, or until the
//! attempt budget runs out. Transient fetch and parse failures skip to
//! the next attempt; they never abort the loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::{ComfyUIApi, HistoryMap};
use crate::download;
use crate::generate::GenerateError;

/// How history is fetched on each poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStrategy {
    /// Fetch `GET /history` and look the prompt up client-side.
    /// Works against servers without id-scoped lookups.
    FullHistory,
    /// Fetch `GET /history/{prompt_id}` directly. More efficient when
    /// the target server supports it.
    PerPrompt,
}

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between attempts.
    pub interval: Duration,
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,
    /// History fetch strategy.
    pub history: HistoryStrategy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
            history: HistoryStrategy::FullHistory,
        }
    }
}

/// Poll until the prompt completes and an image is downloaded.
///
/// Returns the raw bytes of the first image that downloads
/// successfully. The cancellation token is honored between attempts
/// and during the sleep interval.
///
/// When the budget is exhausted, a best-effort `/queue` check decides
/// between [`GenerateError::StillProcessing`] (work may still finish
/// server-side) and [`GenerateError::Timeout`].
pub async fn poll_for_image(
    api: &ComfyUIApi,
    prompt_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, GenerateError> {
    for attempt in 1..=config.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(prompt_id = %prompt_id, attempt, "Polling cancelled");
                return Err(GenerateError::Cancelled);
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        let history = match fetch_history(api, prompt_id, config.history).await {
            Ok(history) => history,
            Err(e) => {
                tracing::debug!(
                    prompt_id = %prompt_id,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    "History not available yet",
                );
                continue;
            }
        };

        let Some(entry) = history.get(prompt_id) else {
            tracing::debug!(prompt_id = %prompt_id, attempt, "Prompt not in history yet");
            continue;
        };

        if !entry.status.completed {
            tracing::debug!(
                prompt_id = %prompt_id,
                attempt,
                status = %entry.status.status_str,
                "Prompt not completed yet",
            );
            continue;
        }

        if entry.outputs.is_empty() {
            tracing::debug!(prompt_id = %prompt_id, attempt, "Completed prompt has no outputs yet");
            continue;
        }

        for filename in image_filenames(&entry.outputs) {
            if let Some(bytes) = download::fetch_image(api, filename).await {
                return Ok(bytes);
            }
            // Entry unusable; keep scanning remaining images and, if
            // none works, remaining poll attempts.
        }

        tracing::debug!(
            prompt_id = %prompt_id,
            attempt,
            nodes = entry.outputs.len(),
            "Outputs present but no retrievable image yet",
        );
    }

    exhausted_error(api, prompt_id, config.max_attempts).await
}

/// Fetch history according to the configured strategy.
async fn fetch_history(
    api: &ComfyUIApi,
    prompt_id: &str,
    strategy: HistoryStrategy,
) -> Result<HistoryMap, crate::api::ComfyUIApiError> {
    match strategy {
        HistoryStrategy::FullHistory => api.get_history().await,
        HistoryStrategy::PerPrompt => api.get_prompt_history(prompt_id).await,
    }
}

/// Collect every non-empty image filename from a prompt's outputs, in
/// node scan order.
///
/// No specific node id is assumed; the first node carrying an `images`
/// list supplies the first candidates.
fn image_filenames(outputs: &serde_json::Map<String, serde_json::Value>) -> Vec<&str> {
    let mut filenames = Vec::new();
    for (node_id, node_output) in outputs {
        let Some(images) = node_output.get("images").and_then(|v| v.as_array()) else {
            continue;
        };
        tracing::debug!(node_id = %node_id, count = images.len(), "Node has image outputs");
        for image in images {
            match image.get("filename").and_then(|v| v.as_str()) {
                Some(name) if !name.is_empty() => filenames.push(name),
                _ => tracing::debug!(node_id = %node_id, "Image entry without filename"),
            }
        }
    }
    filenames
}

/// Build the terminal error after the attempt budget ran out.
///
/// A nonzero queue means the server may still produce the image
/// out-of-band; callers get a distinct error for their diagnostics.
async fn exhausted_error(
    api: &ComfyUIApi,
    prompt_id: &str,
    attempts: u32,
) -> Result<Vec<u8>, GenerateError> {
    match api.get_queue_status().await {
        Ok(queue) if queue.is_busy() => {
            tracing::error!(
                prompt_id = %prompt_id,
                running = queue.running_size,
                pending = queue.pending_size,
                "Timed out while ComfyUI still reports work in its queue",
            );
            Err(GenerateError::StillProcessing {
                running: queue.running_size,
                pending: queue.pending_size,
            })
        }
        Ok(_) => Err(GenerateError::Timeout { attempts }),
        Err(e) => {
            tracing::warn!(prompt_id = %prompt_id, error = %e, "Queue status check failed");
            Err(GenerateError::Timeout { attempts })
        }
    }
}
