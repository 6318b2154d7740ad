//! One-shot generation worker.
//!
//! Reads connection settings from the environment (`.env` supported),
//! runs a single image generation for the prompt given on the command
//! line, and prints the resulting material records.
//!
//! Environment:
//! - `COMFYUI_API_URL` — base HTTP URL of the ComfyUI server.
//! - `COMFYUI_WORKFLOW_TEMPLATE` — path to the workflow template JSON.
//! - `CLIPFORGE_STORAGE_DIR` — storage root (optional).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipforge_worker=info,clipforge_comfyui=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(prompt), Some(task_id)) = (args.next(), args.next()) else {
        eprintln!("Usage: clipforge-worker <prompt> <task-id>");
        std::process::exit(2);
    };

    let api_url = std::env::var("COMFYUI_API_URL").unwrap_or_default();
    let template_path = std::env::var("COMFYUI_WORKFLOW_TEMPLATE").unwrap_or_default();
    let template = match std::fs::read_to_string(&template_path) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(path = %template_path, error = %e, "Cannot read workflow template");
            String::new()
        }
    };

    tracing::info!(prompt = %prompt, task_id = %task_id, "Starting generation");

    let materials =
        clipforge_comfyui::search_images(&prompt, &task_id, &api_url, &template).await;

    if materials.is_empty() {
        tracing::warn!("No materials generated");
        std::process::exit(1);
    }
    for material in materials {
        println!("{}\t{}\t{}s", material.provider, material.url, material.duration);
    }
}
