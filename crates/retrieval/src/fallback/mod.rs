//! Fallback answer providers.
//!
//! When the primary provider fails in search mode, each provider in the chain
//! is tried in a fixed order until one yields non-empty text.

pub mod duckduckgo;
pub mod wikipedia;

pub use duckduckgo::InstantAnswerProvider;
pub use wikipedia::WikipediaProvider;

use crate::types::{ProviderUsed, RetrievalOutcome, Source};
use lumina_core::AppResult;
use std::sync::Arc;
use tokio::time::Instant;

/// Text and citations produced by a fallback provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAnswer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// One fallback stage.
#[async_trait::async_trait]
pub trait FallbackProvider: Send + Sync {
    /// Stage reported in the outcome when this provider answers.
    fn kind(&self) -> ProviderUsed;

    /// Try to answer `query`.
    ///
    /// `Ok(None)` means the provider had nothing to say; `Err` means it
    /// failed. The chain treats both as "no answer".
    async fn attempt(&self, query: &str) -> AppResult<Option<ProviderAnswer>>;
}

/// Ordered list of fallback providers.
#[derive(Clone, Default)]
pub struct FallbackChain {
    providers: Vec<Arc<dyn FallbackProvider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn FallbackProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Try providers in order, stopping at the first non-empty answer.
    ///
    /// Providers still running at `deadline` are abandoned.
    pub async fn resolve(&self, query: &str, deadline: Instant) -> RetrievalOutcome {
        if query.trim().is_empty() {
            tracing::debug!("Blank query, skipping fallback providers");
            return RetrievalOutcome::nothing();
        }

        for provider in &self.providers {
            let kind = provider.kind();
            tracing::debug!(provider = kind.as_str(), "Trying fallback provider");

            match tokio::time::timeout_at(deadline, provider.attempt(query)).await {
                Ok(Ok(Some(answer))) if !answer.text.trim().is_empty() => {
                    tracing::info!(
                        provider = kind.as_str(),
                        sources = answer.sources.len(),
                        "Fallback provider answered"
                    );
                    return RetrievalOutcome::answered(answer.text, answer.sources, kind);
                }
                Ok(Ok(_)) => {
                    tracing::debug!(provider = kind.as_str(), "Fallback provider had no answer");
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider = kind.as_str(), error = %e, "Fallback provider failed");
                }
                Err(_) => {
                    tracing::warn!(provider = kind.as_str(), "Deadline reached during fallback");
                    break;
                }
            }
        }

        RetrievalOutcome::nothing()
    }
}
