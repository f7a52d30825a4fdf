//! LLM integration crate for Lumina.
//!
//! This crate provides a provider-agnostic abstraction for calling a
//! generative model, plus a typed response model whose fields are all
//! optional so that partial provider responses stay representable.
//!
//! # Providers
//! - **Gemini**: Generative Language API, with optional search grounding
//!
//! # Example
//! ```no_run
//! use lumina_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new(
//!     "https://generativelanguage.googleapis.com",
//!     "gemini-2.0-flash",
//!     "api-key",
//!     Duration::from_secs(30),
//! )?;
//! let request = LlmRequest::single("Hello, world!").with_grounding(true);
//! let response = client.generate(&request).await?;
//! println!("{:?}", response.first_text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatRole, ChatTurn, LlmClient, LlmRequest};
pub use factory::create_client;
pub use providers::GeminiClient;
pub use types::{
    Candidate, CandidateContent, ContentPart, FinishReason, GroundingEntry, GroundingMetadata,
    LlmResponse, ProviderType, WebRef,
};
