//! LLM provider factory.
//!
//! Creates an LLM client from application configuration, resolving the
//! provider name and injecting the API key.

use crate::client::LlmClient;
use crate::providers::GeminiClient;
use crate::types::ProviderType;
use lumina_core::config::GeminiSettings;
use lumina_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini")
/// * `settings` - Endpoint, model and timeout
/// * `api_key` - API key; required by every supported provider
///
/// # Errors
/// Returns `MissingCredential` when the key is absent and `Config` for an
/// unknown provider. No network call is made either way.
pub fn create_client(
    provider: &str,
    settings: &GeminiSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Gemini => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    AppError::MissingCredential("Gemini provider requires an API key".to_string())
                })?;
            let client = GeminiClient::new(
                &settings.endpoint,
                &settings.model,
                key,
                settings.timeout(),
            )?;
            Ok(Arc::new(client))
        }
    }
}
