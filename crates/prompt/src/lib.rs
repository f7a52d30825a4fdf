//! Prompt system for Lumina.
//!
//! This crate turns configuration and request state into provider-ready text:
//! - YAML-based persona definitions
//! - Directive composition per retrieval mode, with optional link context
//! - Handlebars-rendered single-turn prompts (context synthesis, titles)

pub mod builder;
pub mod composer;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{synthesis_prompt, title_prompt};
pub use composer::InstructionComposer;
pub use loader::{default_persona, load_persona, load_persona_or_default};
pub use types::{LinkContext, PersonaDefinition, RetrievalMode};
