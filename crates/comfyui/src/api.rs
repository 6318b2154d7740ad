//! REST API client for the ComfyUI HTTP endpoints.
//!
//! Wraps the ComfyUI HTTP API (workflow submission, history retrieval,
//! queue status, image download) using [`reqwest`].

use std::collections::HashMap;

use serde::Deserialize;

/// HTTP client for a single ComfyUI instance.
pub struct ComfyUIApi {
    client: reqwest::Client,
    api_url: String,
}

/// Response returned by the ComfyUI `/prompt` endpoint after
/// successfully queuing a workflow.
///
/// `prompt_id` is optional at the wire level so that a success status
/// with a malformed body can be reported as a missing job id rather
/// than a JSON decode failure.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued prompt.
    #[serde(default)]
    pub prompt_id: Option<String>,
}

/// One entry of the history mapping, keyed by prompt id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    /// Execution status of the prompt.
    #[serde(default)]
    pub status: JobStatus,
    /// Per-node outputs. Payloads stay loosely typed because node
    /// output shapes vary by node class; only `images[].filename` is
    /// interpreted here.
    #[serde(default)]
    pub outputs: serde_json::Map<String, serde_json::Value>,
}

/// Status block of a history entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStatus {
    /// Set to `true` only once the prompt has finished executing.
    #[serde(default)]
    pub completed: bool,
    /// Human-readable status, e.g. `"success"` or `"error"`.
    #[serde(default)]
    pub status_str: String,
}

/// Response of the `/queue` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueStatus {
    #[serde(default)]
    pub running_size: i64,
    #[serde(default)]
    pub pending_size: i64,
}

impl QueueStatus {
    /// Whether the server reports any running or pending work.
    pub fn is_busy(&self) -> bool {
        self.running_size > 0 || self.pending_size > 0
    }
}

/// Full history mapping as returned by `/history`.
pub type HistoryMap = HashMap<String, HistoryEntry>;

/// Errors from the ComfyUI REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ComfyUI returned a non-2xx status code.
    #[error("ComfyUI API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ComfyUIApi {
    /// Create a new API client for a ComfyUI instance.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8188`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// HTTP base URL this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit a workflow for execution.
    ///
    /// Sends a `POST /prompt` request with the given workflow JSON and
    /// client ID. Returns the server-assigned `prompt_id`, if present.
    pub async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        client_id: &str,
    ) -> Result<SubmitResponse, ComfyUIApiError> {
        let body = serde_json::json!({
            "prompt": workflow,
            "client_id": client_id,
        });

        let response = self
            .client
            .post(format!("{}/prompt", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Retrieve the full execution history.
    ///
    /// Sends a `GET /history` request returning a mapping from prompt
    /// id to [`HistoryEntry`]. Fetching everything (rather than one id)
    /// tolerates servers that do not support id-scoped lookups.
    pub async fn get_history(&self) -> Result<HistoryMap, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/history", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Retrieve execution history for a specific prompt.
    ///
    /// Sends a `GET /history/{prompt_id}` request. The server responds
    /// with a mapping containing at most that one entry, so the return
    /// type matches [`get_history`](Self::get_history).
    pub async fn get_prompt_history(&self, prompt_id: &str) -> Result<HistoryMap, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/history/{}", self.api_url, prompt_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Retrieve the execution queue status.
    ///
    /// Sends a `GET /queue` request returning running/pending counts.
    pub async fn get_queue_status(&self) -> Result<QueueStatus, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/queue", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download raw bytes from an absolute URL.
    ///
    /// Used for image retrieval, where the URL is built from the base
    /// URL by the candidate generators in [`crate::download`].
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ComfyUIApiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ComfyUIApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ComfyUIApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ComfyUIApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ComfyUIApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
