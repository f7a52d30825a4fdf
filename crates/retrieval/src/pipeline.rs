//! Tiered answer resolution.
//!
//! One request runs: optional crawl of a linked page, one primary provider
//! call, and in search mode the fallback chain. Every stage shares a single
//! end-to-end deadline.

use crate::crawler::{Crawler, HttpCrawler};
use crate::fallback::{FallbackChain, FallbackProvider, InstantAnswerProvider, WikipediaProvider};
use crate::primary::{PrimaryAnswer, PrimaryEngine, PrimaryFailure};
use crate::sources::dedupe_sources;
use crate::types::{AnswerResponse, CrawledDocument, Message, ProviderUsed, RetrievalMode};
use crate::url::{detect_url, last_user_message};
use lumina_core::http::{build_client, DEFAULT_USER_AGENT};
use lumina_core::{AppConfig, AppResult};
use lumina_llm::create_client;
use lumina_prompt::{load_persona_or_default, InstructionComposer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Reply when search mode exhausts every provider.
pub const SEARCH_FAILURE_ANSWER: &str = "I tried searching but couldn't find a confident answer. I'd rather be honest than guess wrong! Could you clarify?";

/// Reply when the primary provider fails in memory mode.
pub const MEMORY_FAILURE_ANSWER: &str =
    "I'm having a little trouble connecting right now. Mind trying again?";

/// Stand-in deadline when the configured budget overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Resolves a conversation into an answer with sources.
pub struct AnswerService {
    composer: InstructionComposer,
    crawler: Arc<dyn Crawler>,
    primary: PrimaryEngine,
    fallbacks: FallbackChain,
    deadline: Duration,
}

impl AnswerService {
    pub fn new(
        composer: InstructionComposer,
        crawler: Arc<dyn Crawler>,
        primary: PrimaryEngine,
        fallbacks: FallbackChain,
        deadline: Duration,
    ) -> Self {
        Self {
            composer,
            crawler,
            primary,
            fallbacks,
            deadline,
        }
    }

    /// Wire the production stages from configuration.
    ///
    /// The credential is checked first, so a missing key fails before any
    /// client is built or any request is sent.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.require_api_key()?;
        config.validate()?;

        let persona = load_persona_or_default(config.persona_path().as_deref())?;
        let composer = InstructionComposer::new(persona)?;

        let llm = create_client("gemini", &config.gemini, Some(api_key))?;
        let crawler = HttpCrawler::new(&config.crawler)?;

        let http = build_client(config.fallback.timeout(), DEFAULT_USER_AGENT)?;
        let providers: Vec<Arc<dyn FallbackProvider>> = vec![
            Arc::new(WikipediaProvider::new(
                http.clone(),
                &config.fallback,
                llm.clone(),
            )),
            Arc::new(InstantAnswerProvider::new(http, &config.fallback)),
        ];

        tracing::debug!(
            model = %config.gemini.model,
            fallbacks = providers.len(),
            deadline_secs = config.pipeline.deadline_secs,
            "Answer service ready"
        );

        Ok(Self::new(
            composer,
            Arc::new(crawler),
            PrimaryEngine::new(llm),
            FallbackChain::new(providers),
            config.pipeline.deadline(),
        ))
    }

    /// Answer the conversation. Never fails: every failure path ends in a
    /// canned reply with no sources.
    #[tracing::instrument(skip(self, history, mode), fields(mode = mode.as_str(), messages = history.len()))]
    pub async fn resolve(&self, history: &[Message], mode: RetrievalMode) -> AnswerResponse {
        let deadline = deadline_after(Instant::now(), self.deadline);

        let document = match detect_url(history) {
            Some(url) => Some(self.crawl(url, deadline).await),
            None => None,
        };

        let directive = self.directive(mode, document.as_ref());
        let grounding = match mode {
            RetrievalMode::Search => true,
            RetrievalMode::Memory => false,
        };

        let failure = match self.answer_primary(history, &directive, grounding, deadline).await {
            Ok(answer) => {
                return AnswerResponse {
                    answer: answer.text,
                    sources: answer.sources,
                    provider: ProviderUsed::Primary,
                };
            }
            Err(failure) => failure,
        };
        tracing::warn!(error = %failure, "Primary provider failed");

        match mode {
            RetrievalMode::Memory => canned(MEMORY_FAILURE_ANSWER),
            RetrievalMode::Search => {
                let query = last_user_message(history).unwrap_or("");
                let outcome = self.fallbacks.resolve(query, deadline).await;
                match outcome.answer_text {
                    Some(answer) => AnswerResponse {
                        answer,
                        sources: dedupe_sources([outcome.sources]),
                        provider: outcome.provider_used,
                    },
                    None => {
                        tracing::info!("No provider produced an answer");
                        canned(SEARCH_FAILURE_ANSWER)
                    }
                }
            }
        }
    }

    async fn crawl(&self, url: &str, deadline: Instant) -> CrawledDocument {
        match tokio::time::timeout_at(deadline, self.crawler.crawl(url)).await {
            Ok(document) => document,
            Err(_) => CrawledDocument::from_error(url, "deadline exceeded", self.crawler.max_chars()),
        }
    }

    fn directive(&self, mode: RetrievalMode, document: Option<&CrawledDocument>) -> String {
        let link = document.map(CrawledDocument::as_link_context);
        match self.composer.compose(mode, link) {
            Ok(directive) => directive,
            Err(e) => {
                tracing::error!(error = %e, "Directive composition failed, using bare persona");
                self.composer.persona().persona.clone()
            }
        }
    }

    async fn answer_primary(
        &self,
        history: &[Message],
        directive: &str,
        grounding: bool,
        deadline: Instant,
    ) -> Result<PrimaryAnswer, PrimaryFailure> {
        tokio::time::timeout_at(deadline, self.primary.answer(history, directive, grounding))
            .await
            .unwrap_or_else(|_| Err(PrimaryFailure::Transport("deadline exceeded".to_string())))
    }
}

/// `start + budget`, saturating to a far-future instant on overflow.
fn deadline_after(start: Instant, budget: Duration) -> Instant {
    start
        .checked_add(budget)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

fn canned(answer: &str) -> AnswerResponse {
    AnswerResponse {
        answer: answer.to_string(),
        sources: Vec::new(),
        provider: ProviderUsed::None,
    }
}

/// Build the production service and answer one conversation.
///
/// Fails only when configuration prevents building the service, most
/// notably `AppError::MissingCredential`; no outbound call is made then.
pub async fn resolve_answer(
    config: &AppConfig,
    history: &[Message],
    mode: RetrievalMode,
) -> AppResult<AnswerResponse> {
    let service = AnswerService::from_config(config)?;
    let response = service.resolve(history, mode).await;
    tracing::info!(
        provider = response.provider.as_str(),
        sources = response.sources.len(),
        "Answer resolved"
    );
    Ok(response)
}
