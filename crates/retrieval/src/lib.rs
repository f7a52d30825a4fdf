//! Tiered answer retrieval for Lumina.
//!
//! Turns a conversation into an answer with cited sources:
//! - Link detection in the latest user turn and on-demand page crawling
//! - One grounded (search mode) or ungrounded (memory mode) primary call
//! - Wikipedia and DuckDuckGo fallbacks when the primary call fails in search mode
//! - Source deduplication across providers
//!
//! # Example
//! ```no_run
//! use lumina_core::AppConfig;
//! use lumina_retrieval::{resolve_answer, Message, RetrievalMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let history = vec![Message::user("Who designed the Rust language?")];
//! let response = resolve_answer(&config, &history, RetrievalMode::Search).await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod crawler;
pub mod fallback;
pub mod pipeline;
pub mod primary;
pub mod sources;
pub mod title;
pub mod types;
pub mod url;

#[cfg(test)]
mod tests;

// Re-export main types
pub use crawler::{Crawler, HttpCrawler};
pub use fallback::{FallbackChain, FallbackProvider, ProviderAnswer};
pub use pipeline::{resolve_answer, AnswerService, MEMORY_FAILURE_ANSWER, SEARCH_FAILURE_ANSWER};
pub use primary::{PrimaryAnswer, PrimaryEngine, PrimaryFailure};
pub use sources::{dedupe_sources, SourceSet};
pub use title::{generate_title, resolve_title, DEFAULT_TITLE};
pub use types::{
    AnswerResponse, CrawledDocument, Message, ProviderUsed, RetrievalMode, RetrievalOutcome, Role,
    Source,
};
pub use url::detect_url;
