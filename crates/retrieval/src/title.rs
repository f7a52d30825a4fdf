//! Conversation title generation.

use lumina_core::AppConfig;
use lumina_llm::{create_client, LlmClient, LlmRequest};
use lumina_prompt::title_prompt;

/// Title used whenever generation is not possible.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Ask the provider for a short title for `prompt`.
///
/// Never fails: any error, or an empty result after cleanup, gives
/// [`DEFAULT_TITLE`].
pub async fn generate_title(client: &dyn LlmClient, prompt: &str) -> String {
    if prompt.trim().is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    let request = match title_prompt(prompt) {
        Ok(text) => LlmRequest::single(text),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build title prompt");
            return DEFAULT_TITLE.to_string();
        }
    };

    match client.generate(&request).await {
        Ok(response) => {
            let title = clean_title(response.first_text().unwrap_or(""));
            if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Title generation failed");
            DEFAULT_TITLE.to_string()
        }
    }
}

/// Build a provider from configuration and generate a title.
pub async fn resolve_title(config: &AppConfig, prompt: &str) -> String {
    let client = config
        .require_api_key()
        .and_then(|key| create_client("gemini", &config.gemini, Some(key)));

    match client {
        Ok(client) => generate_title(client.as_ref(), prompt).await,
        Err(e) => {
            tracing::warn!(error = %e, "No provider for title generation");
            DEFAULT_TITLE.to_string()
        }
    }
}

/// Strip markdown emphasis, quotes and headings the model may add anyway.
fn clean_title(raw: &str) -> String {
    raw.replace(['*', '"', '#'], "").trim().to_string()
}
