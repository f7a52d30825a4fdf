//! Primary answering engine.
//!
//! One call to the generative provider. Every way that call can fail to
//! produce an answer collapses into [`PrimaryFailure`].

use crate::sources::SourceSet;
use crate::types::{Message, Role, Source};
use lumina_core::AppError;
use lumina_llm::{ChatTurn, LlmClient, LlmRequest, LlmResponse};
use std::sync::Arc;
use thiserror::Error;

/// Why the primary provider produced no usable answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimaryFailure {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("answer blocked by provider policy ({0})")]
    PolicyBlock(String),

    #[error("provider returned no usable answer")]
    Empty,
}

impl From<AppError> for PrimaryFailure {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Transport(msg) => PrimaryFailure::Transport(msg),
            AppError::Upstream { status, body } => PrimaryFailure::Rejected { status, body },
            AppError::Malformed(msg) | AppError::Serialization(msg) => {
                PrimaryFailure::Malformed(msg)
            }
            other => PrimaryFailure::Transport(other.to_string()),
        }
    }
}

/// A usable primary answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAnswer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// Invokes the generative provider on the full conversation.
#[derive(Clone)]
pub struct PrimaryEngine {
    client: Arc<dyn LlmClient>,
}

impl PrimaryEngine {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Answer the conversation under `directive`.
    ///
    /// With `grounding`, the provider's search tool is requested and its
    /// citations are returned; without it no sources are reported.
    pub async fn answer(
        &self,
        history: &[Message],
        directive: &str,
        grounding: bool,
    ) -> Result<PrimaryAnswer, PrimaryFailure> {
        let request = LlmRequest::new(to_turns(history))
            .with_system(directive)
            .with_grounding(grounding);

        let response = self.client.generate(&request).await?;
        let answer = select_answer(&response, grounding)?;

        tracing::info!(
            provider = self.client.provider_name(),
            sources = answer.sources.len(),
            "Primary provider answered"
        );
        Ok(answer)
    }
}

/// Map history onto the provider's two roles, skipping empty messages.
fn to_turns(history: &[Message]) -> Vec<ChatTurn> {
    history
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| match m.role {
            Role::Assistant => ChatTurn::model(m.content.clone()),
            Role::User => ChatTurn::user(m.content.clone()),
        })
        .collect()
}

/// Pick the first candidate that is neither policy-blocked nor textless.
fn select_answer(response: &LlmResponse, grounding: bool) -> Result<PrimaryAnswer, PrimaryFailure> {
    if response.candidates.is_empty() {
        return Err(match response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            Some(reason) => PrimaryFailure::PolicyBlock(reason),
            None => PrimaryFailure::Empty,
        });
    }

    let usable = response
        .candidates
        .iter()
        .filter(|c| !c.is_policy_blocked())
        .find_map(|c| c.text().map(|text| (c, text)));

    let Some((candidate, text)) = usable else {
        let blocked = response.candidates.iter().find(|c| c.is_policy_blocked());
        return Err(match blocked.and_then(|c| c.finish_reason.clone()) {
            Some(reason) => PrimaryFailure::PolicyBlock(reason),
            None => PrimaryFailure::Empty,
        });
    };

    let sources = if grounding {
        candidate
            .grounding_refs()
            .filter_map(|web| web.complete())
            .map(|(uri, title)| Source::new(title, uri))
            .collect::<SourceSet>()
            .into_vec()
    } else {
        Vec::new()
    };

    Ok(PrimaryAnswer {
        text: text.to_string(),
        sources,
    })
}
