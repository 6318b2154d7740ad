//! ComfyUI image-generation client.
//!
//! Submits a workflow built from a JSON template and a text prompt to a
//! ComfyUI server, polls the history endpoint until the job completes,
//! downloads the resulting image through a list of candidate URL
//! shapes, and saves it under a task directory.
//!
//! The outward-facing entry point for the media-search pipeline is
//! [`search::search_images`]; the typed single-image operation is
//! [`generate::generate_image`].

pub mod api;
pub mod download;
pub mod generate;
pub mod poll;
pub mod search;
pub mod workflow;

pub use generate::{generate_image, generate_image_with, GenerateError};
pub use poll::{HistoryStrategy, PollConfig};
pub use search::search_images;
