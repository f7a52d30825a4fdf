//! Gemini provider implementation.
//!
//! Talks to the Generative Language API `generateContent` endpoint.
//! API: https://ai.google.dev/api/generate-content

use crate::client::{LlmClient, LlmRequest};
use crate::types::LlmResponse;
use lumina_core::http::{build_client, ensure_success, DEFAULT_USER_AGENT};
use lumina_core::{AppError, AppResult};
use serde::Serialize;
use std::time::Duration;

/// Header carrying the API key (keeps the key out of logged URLs).
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiSystem {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

/// Gemini LLM client.
pub struct GeminiClient {
    /// Base URL for the API host
    base_url: String,

    /// Model identifier (e.g., "gemini-2.0-flash")
    model: String,

    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: build_client(timeout, DEFAULT_USER_AGENT)?,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Convert LlmRequest to Gemini format.
    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| GeminiContent {
                role: turn.role.as_str(),
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system.as_ref().map(|text| GeminiSystem {
            parts: vec![GeminiPart { text: text.clone() }],
        });

        let tools = if request.grounding {
            vec![GeminiTool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GeminiRequest {
            contents,
            system_instruction,
            tools,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(
            model = %self.model,
            grounding = request.grounding,
            turns = request.turns.len(),
            "Sending generation request to Gemini"
        );

        let body = self.to_gemini_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(response).await?;

        let bytes = response.bytes().await?;
        let parsed: LlmResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Malformed(format!("Failed to parse Gemini response: {}", e)))?;

        tracing::debug!(
            candidates = parsed.candidates.len(),
            "Received generation response from Gemini"
        );

        Ok(parsed)
    }
}
