//! Search-result material records.
//!
//! Every media provider (stock video search, image generation, ...)
//! returns its results as a list of [`MaterialInfo`] records so the
//! downstream assembly steps can treat all sources uniformly.

use serde::{Deserialize, Serialize};

/// A single piece of source material produced by a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialInfo {
    /// Provider tag, e.g. `"pexels"` or `"comfyui"`.
    pub provider: String,
    /// Remote URL or local file path of the material.
    pub url: String,
    /// Playback duration in seconds. Still images carry a nominal
    /// duration so they can be scheduled like clips.
    pub duration: f64,
}

impl MaterialInfo {
    /// Create a record for a locally stored file.
    pub fn local(provider: impl Into<String>, path: impl Into<String>, duration: f64) -> Self {
        Self {
            provider: provider.into(),
            url: path.into(),
            duration,
        }
    }
}
