//! LLM client abstraction and request types.
//!
//! This module defines the seam between Lumina and a generative provider.

use lumina_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::types::LlmResponse;

/// Speaker of a conversation turn, in the provider's two-party vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One conversation turn sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Text-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Conversation turns, oldest first
    pub turns: Vec<ChatTurn>,

    /// Directive text sent ahead of the turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Ask the provider to ground its answer with web search
    #[serde(default)]
    pub grounding: bool,
}

impl LlmRequest {
    /// Create a request from conversation turns.
    pub fn new(turns: Vec<ChatTurn>) -> Self {
        Self {
            turns,
            system: None,
            grounding: false,
        }
    }

    /// Create a single-turn request.
    pub fn single(prompt: impl Into<String>) -> Self {
        Self::new(vec![ChatTurn::user(prompt)])
    }

    /// Set the directive text.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Enable or disable search grounding.
    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }
}

/// Trait for generative providers.
///
/// Implementations perform exactly one outbound call per `generate`, with a
/// bounded timeout, and never retry.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "gemini").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming generation.
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies are
    /// errors; a successful call with no usable candidate is not.
    async fn generate(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
