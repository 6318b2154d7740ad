//! Workflow template substitution.
//!
//! A workflow template is the JSON text of a ComfyUI node graph with
//! either the [`PROMPT_PLACEHOLDER`] token or one or more `inputs.text`
//! fields to be filled with the user's prompt. The result must parse
//! as JSON before anything is sent to the server.

use serde_json::Value;

/// Placeholder token replaced with the prompt text wherever it occurs.
pub const PROMPT_PLACEHOLDER: &str = "{{text_positive}}";

/// Substitute the prompt into a workflow template and parse the result.
///
/// Resolution order:
/// 1. If the template contains [`PROMPT_PLACEHOLDER`], every occurrence
///    is replaced with `prompt` on the raw text.
/// 2. Otherwise the template is parsed and every node carrying an
///    `inputs.text` field gets its value overwritten with `prompt`.
///    A template with no such field is used as-is (logged, not an
///    error).
///
/// The final text must parse as JSON; a parse failure is returned to
/// the caller before any network call is made.
pub fn substitute_prompt(template: &str, prompt: &str) -> Result<Value, serde_json::Error> {
    if template.contains(PROMPT_PLACEHOLDER) {
        let substituted = template.replace(PROMPT_PLACEHOLDER, prompt);
        tracing::debug!("Replaced prompt placeholder in workflow template");
        return serde_json::from_str(&substituted);
    }

    tracing::warn!(
        "Workflow template has no {PROMPT_PLACEHOLDER} placeholder, scanning for text inputs"
    );

    match serde_json::from_str::<Value>(template) {
        Ok(Value::Object(mut nodes)) => {
            let mut replaced = 0usize;
            for (node_id, node) in nodes.iter_mut() {
                if let Some(text) = node.get_mut("inputs").and_then(|i| i.get_mut("text")) {
                    tracing::debug!(node_id = %node_id, "Overwriting text input with prompt");
                    *text = Value::String(prompt.to_string());
                    replaced += 1;
                }
            }
            if replaced == 0 {
                tracing::warn!("No text input found in workflow template, using it as-is");
            }
            Ok(Value::Object(nodes))
        }
        Ok(other) => {
            // Not a node mapping; nothing to scan but still valid JSON.
            tracing::warn!("Workflow template is not a JSON object, using it as-is");
            Ok(other)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Workflow template is not valid JSON");
            Err(e)
        }
    }
}
