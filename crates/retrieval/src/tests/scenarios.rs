//! End-to-end answer resolution through `AnswerService`.

use super::fixtures::{spawn, wikipedia_router};
use super::mocks::{CallLog, MockCrawler, MockLlm, MockProvider, ProviderScript};
use crate::crawler::{Crawler, HttpCrawler};
use crate::fallback::{FallbackChain, FallbackProvider, WikipediaProvider};
use crate::pipeline::{resolve_answer, AnswerService, MEMORY_FAILURE_ANSWER, SEARCH_FAILURE_ANSWER};
use crate::primary::PrimaryEngine;
use crate::types::{Message, ProviderUsed, RetrievalMode, Source};
use axum::http::StatusCode;
use axum::{Json, Router};
use lumina_core::config::{CrawlerSettings, FallbackSettings};
use lumina_core::{AppConfig, AppError};
use lumina_llm::{LlmClient, LlmResponse};
use lumina_prompt::{default_persona, InstructionComposer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn service(
    llm: Arc<dyn LlmClient>,
    crawler: Arc<dyn Crawler>,
    fallbacks: Vec<Arc<dyn FallbackProvider>>,
    deadline: Duration,
) -> AnswerService {
    let composer = InstructionComposer::new(default_persona().unwrap()).unwrap();
    AnswerService::new(
        composer,
        crawler,
        PrimaryEngine::new(llm),
        FallbackChain::new(fallbacks),
        deadline,
    )
}

/// Both fallback slots filled with mocks sharing one call log.
fn mock_fallbacks(kb: ProviderScript, ia: ProviderScript) -> (Vec<Arc<dyn FallbackProvider>>, CallLog) {
    let (kb, log) = MockProvider::new(ProviderUsed::KnowledgeBase, kb);
    let (ia, _) = MockProvider::with_log(ProviderUsed::InstantAnswer, ia, log.clone());
    (vec![kb, ia], log)
}

fn grounded_response() -> LlmResponse {
    serde_json::from_value(serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Grounded answer"}]},
            "finishReason": "STOP",
            "groundingMetadata": {
                "groundingChunks": [
                    {"web": {"uri": "https://a.test", "title": "A"}},
                    {"web": {"uri": "https://b.test", "title": "B"}}
                ],
                "groundingAttributions": [
                    {"web": {"uri": "https://a.test", "title": "A again"}}
                ]
            }
        }]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_memory_mode_primary_success() {
    let llm = MockLlm::replying(vec![Ok(LlmResponse::from_text("Hello! 👋"))]);
    let crawler = MockCrawler::with_text("unused");
    let (fallbacks, log) = mock_fallbacks(ProviderScript::Nothing, ProviderScript::Nothing);
    let svc = service(llm.clone(), crawler.clone(), fallbacks, Duration::from_secs(30));

    let response = svc.resolve(&[Message::user("hi")], RetrievalMode::Memory).await;

    assert_eq!(response.answer, "Hello! 👋");
    assert!(response.sources.is_empty());
    assert_eq!(response.provider, ProviderUsed::Primary);

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].grounding);
    assert!(requests[0]
        .system
        .as_deref()
        .unwrap()
        .contains("MEMORY MODE"));
    assert!(crawler.urls().is_empty());
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_link_is_crawled_and_quoted() {
    let llm = MockLlm::replying(vec![Ok(LlmResponse::from_text("It is about widgets."))]);
    let crawler = MockCrawler::with_text("Widgets are small devices.");
    let (fallbacks, _) = mock_fallbacks(ProviderScript::Nothing, ProviderScript::Nothing);
    let svc = service(llm.clone(), crawler.clone(), fallbacks, Duration::from_secs(30));

    let history = vec![
        Message::user("read https://old.test/ignored"),
        Message::assistant("ok"),
        Message::user("summarize https://example.com/page"),
    ];
    let response = svc.resolve(&history, RetrievalMode::Memory).await;

    assert_eq!(response.answer, "It is about widgets.");
    assert_eq!(crawler.urls(), vec!["https://example.com/page".to_string()]);

    let directive = llm.requests()[0].system.clone().unwrap();
    assert!(directive.contains("CONTEXT FROM LINK (https://example.com/page)"));
    assert!(directive.contains("Widgets are small devices."));
    assert_eq!(llm.requests()[0].turns.len(), 3);
}

#[tokio::test]
async fn test_search_fallback_to_knowledge_base() {
    let addr = spawn(wikipedia_router()).await;
    let base = format!("http://{}", addr);

    // First reply serves the primary call, second the Wikipedia synthesis
    let llm = MockLlm::replying(vec![
        Err(AppError::Transport("connection reset".to_string())),
        Ok(LlmResponse::from_text("Rust is a systems programming language.")),
    ]);
    let settings = FallbackSettings {
        wikipedia_api: base.clone(),
        wikipedia_rest: base.clone(),
        ..Default::default()
    };
    let http = lumina_core::http::build_client(Duration::from_secs(5), "").unwrap();
    let wikipedia: Arc<dyn FallbackProvider> =
        Arc::new(WikipediaProvider::new(http, &settings, llm.clone()));
    let (instant, log) = MockProvider::new(
        ProviderUsed::InstantAnswer,
        ProviderScript::Answer("should not be used", vec![]),
    );

    let svc = service(
        llm.clone(),
        MockCrawler::with_text("unused"),
        vec![wikipedia, instant],
        Duration::from_secs(30),
    );
    let response = svc
        .resolve(&[Message::user("tell me about rust")], RetrievalMode::Search)
        .await;

    assert_eq!(response.answer, "Rust is a systems programming language.");
    assert_eq!(response.provider, ProviderUsed::KnowledgeBase);
    assert_eq!(
        response.sources,
        vec![
            Source::new(
                "Wikipedia: Rust (programming language)",
                "https://en.wikipedia.org/wiki/Rust_(programming_language)"
            ),
            Source::new("Wikipedia: Rust", format!("{}/wiki/Rust", base)),
        ]
    );
    assert!(log.calls().is_empty());

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].grounding);
    assert!(!requests[1].grounding);
}

#[tokio::test]
async fn test_search_all_providers_empty() {
    let llm = MockLlm::replying(vec![Ok(LlmResponse::default())]);
    let (fallbacks, log) = mock_fallbacks(ProviderScript::Nothing, ProviderScript::Fail);
    let svc = service(
        llm,
        MockCrawler::with_text("unused"),
        fallbacks,
        Duration::from_secs(30),
    );

    let response = svc
        .resolve(&[Message::user("obscure question")], RetrievalMode::Search)
        .await;

    assert_eq!(response.answer, SEARCH_FAILURE_ANSWER);
    assert!(response.sources.is_empty());
    assert_eq!(response.provider, ProviderUsed::None);
    assert_eq!(
        log.calls(),
        vec![ProviderUsed::KnowledgeBase, ProviderUsed::InstantAnswer]
    );
}

#[tokio::test]
async fn test_search_primary_success_skips_fallbacks() {
    let llm = MockLlm::replying(vec![Ok(grounded_response())]);
    let (fallbacks, log) = mock_fallbacks(
        ProviderScript::Answer("kb", vec![]),
        ProviderScript::Answer("ia", vec![]),
    );
    let svc = service(
        llm.clone(),
        MockCrawler::with_text("unused"),
        fallbacks,
        Duration::from_secs(30),
    );

    let response = svc
        .resolve(&[Message::user("latest news")], RetrievalMode::Search)
        .await;

    assert_eq!(response.answer, "Grounded answer");
    assert_eq!(
        response.sources,
        vec![
            Source::new("A again", "https://a.test"),
            Source::new("B", "https://b.test"),
        ]
    );
    assert!(log.calls().is_empty());
    assert!(llm.requests()[0]
        .system
        .as_deref()
        .unwrap()
        .contains("WEB SEARCH ACTIVE"));
}

#[tokio::test]
async fn test_memory_failure_never_uses_fallbacks() {
    let llm = MockLlm::replying(vec![Err(AppError::Upstream {
        status: 503,
        body: "overloaded".to_string(),
    })]);
    let (fallbacks, log) = mock_fallbacks(
        ProviderScript::Answer("kb", vec![]),
        ProviderScript::Answer("ia", vec![]),
    );
    let svc = service(
        llm.clone(),
        MockCrawler::with_text("unused"),
        fallbacks,
        Duration::from_secs(30),
    );

    let response = svc.resolve(&[Message::user("hi")], RetrievalMode::Memory).await;

    assert_eq!(response.answer, MEMORY_FAILURE_ANSWER);
    assert!(response.sources.is_empty());
    assert!(log.calls().is_empty());
    assert!(llm.requests().iter().all(|r| !r.grounding));
}

#[tokio::test]
async fn test_search_falls_through_to_instant_answer() {
    let llm = MockLlm::replying(vec![Err(AppError::Malformed("bad json".to_string()))]);
    let (fallbacks, log) = mock_fallbacks(
        ProviderScript::Fail,
        ProviderScript::Answer(
            "Here is a summary from DuckDuckGo:\n\n**Rust**\nA language.",
            vec![Source::new("DuckDuckGo: Rust", "https://ddg.test/rust")],
        ),
    );
    let svc = service(
        llm,
        MockCrawler::with_text("unused"),
        fallbacks,
        Duration::from_secs(30),
    );

    let response = svc.resolve(&[Message::user("rust")], RetrievalMode::Search).await;

    assert_eq!(response.provider, ProviderUsed::InstantAnswer);
    assert_eq!(
        response.sources,
        vec![Source::new("DuckDuckGo: Rust", "https://ddg.test/rust")]
    );
    assert_eq!(
        log.calls(),
        vec![ProviderUsed::KnowledgeBase, ProviderUsed::InstantAnswer]
    );
}

#[tokio::test]
async fn test_slow_crawl_is_cut_by_deadline() {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        "late"
    });
    let addr = spawn(app).await;

    let crawler = HttpCrawler::new(&CrawlerSettings {
        timeout_secs: 10,
        ..Default::default()
    })
    .unwrap();
    let llm = MockLlm::replying(vec![Ok(LlmResponse::from_text("Could not read it."))]);
    let svc = service(
        llm.clone(),
        Arc::new(crawler),
        Vec::new(),
        Duration::from_secs(1),
    );

    let started = std::time::Instant::now();
    let url = format!("http://{}/slow", addr);
    let response = svc
        .resolve(&[Message::user(format!("read {}", url))], RetrievalMode::Memory)
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(response.answer, "Could not read it.");
    let directive = llm.requests()[0].system.clone().unwrap();
    assert!(directive.contains(&format!("Error crawling {}: deadline exceeded", url)));
}

#[tokio::test]
async fn test_unbounded_deadline_still_answers() {
    let mut config = AppConfig::default();
    config.pipeline.deadline_secs = u64::MAX;
    assert!(config.validate().is_ok());

    let llm = MockLlm::replying(vec![Ok(LlmResponse::from_text("Still here!"))]);
    let (fallbacks, _) = mock_fallbacks(ProviderScript::Nothing, ProviderScript::Nothing);
    let svc = service(
        llm,
        MockCrawler::with_text("unused"),
        fallbacks,
        config.pipeline.deadline(),
    );

    let response = svc
        .resolve(&[Message::user("hello")], RetrievalMode::Search)
        .await;
    assert_eq!(response.answer, "Still here!");
    assert_eq!(response.provider, ProviderUsed::Primary);
}

#[tokio::test]
async fn test_missing_credential_makes_no_outbound_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK
        }
    });
    let addr = spawn(app).await;
    let base = format!("http://{}", addr);

    let mut config = AppConfig::default();
    config.api_key = None;
    config.gemini.endpoint = base.clone();
    config.fallback.wikipedia_api = base.clone();
    config.fallback.wikipedia_rest = base.clone();
    config.fallback.duckduckgo_api = base;

    let history = vec![Message::user(format!("see http://{}/page", addr))];
    let result = resolve_answer(&config, &history, RetrievalMode::Search).await;

    match result {
        Err(err) => {
            assert!(matches!(err, AppError::MissingCredential(_)));
            assert!(err.is_server_error());
        }
        Ok(response) => panic!("expected missing credential, got {:?}", response),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resolve_answer_against_provider_fixture() {
    let app = Router::new().fallback(|| async {
        Json(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello from the fixture"}]},
                "finishReason": "STOP"
            }]
        }))
    });
    let addr = spawn(app).await;

    let mut config = AppConfig::default();
    config.api_key = Some("test-key".to_string());
    config.gemini.endpoint = format!("http://{}", addr);

    let response = resolve_answer(&config, &[Message::user("hi")], RetrievalMode::Memory)
        .await
        .unwrap();
    assert_eq!(response.answer, "Hello from the fixture");
    assert!(response.sources.is_empty());
}
