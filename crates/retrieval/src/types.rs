//! Core types for answer retrieval.

use serde::{Deserialize, Serialize};

pub use lumina_prompt::RetrievalMode;

/// Speaker of a conversation message.
///
/// Any role other than "assistant" is read as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    User,
    Assistant,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("assistant") {
            Role::Assistant
        } else {
            Role::User
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A citation. Two sources are the same source iff their `uri`s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// Cleaned text of a linked page.
///
/// Always produced: when fetching fails, `text` describes the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledDocument {
    pub source_url: String,
    pub text: String,
    pub truncated: bool,
}

impl CrawledDocument {
    /// Build a document from extracted text, clipping it to `max_chars`.
    pub fn from_text(source_url: impl Into<String>, text: &str, max_chars: usize) -> Self {
        let (text, truncated) = truncate_chars(text, max_chars);
        Self {
            source_url: source_url.into(),
            text,
            truncated,
        }
    }

    /// Build a document describing a failed fetch.
    pub fn from_error(source_url: &str, reason: impl std::fmt::Display, max_chars: usize) -> Self {
        let message = format!("Error crawling {}: {}", source_url, reason);
        let (text, _) = truncate_chars(&message, max_chars);
        Self {
            source_url: source_url.to_string(),
            text,
            truncated: false,
        }
    }

    pub fn as_link_context(&self) -> lumina_prompt::LinkContext<'_> {
        lumina_prompt::LinkContext {
            url: &self.source_url,
            text: &self.text,
            truncated: self.truncated,
        }
    }
}

/// Keep at most `max_chars` characters. Returns whether anything was cut.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Stage that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderUsed {
    /// Generative provider, directly
    Primary,
    /// Knowledge-base search plus summary synthesis
    KnowledgeBase,
    /// Instant-answer search
    InstantAnswer,
    /// Nothing answered; a canned reply was used
    #[default]
    None,
}

impl ProviderUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::KnowledgeBase => "knowledge_base",
            Self::InstantAnswer => "instant_answer",
            Self::None => "none",
        }
    }
}

/// Result of one resolution stage.
///
/// `answer_text: None` means the stage found nothing usable, which is not
/// the same thing as the stage failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalOutcome {
    pub answer_text: Option<String>,
    pub sources: Vec<Source>,
    pub provider_used: ProviderUsed,
}

impl RetrievalOutcome {
    pub fn answered(text: String, sources: Vec<Source>, provider_used: ProviderUsed) -> Self {
        Self {
            answer_text: Some(text),
            sources,
            provider_used,
        }
    }

    pub fn nothing() -> Self {
        Self {
            answer_text: None,
            sources: Vec::new(),
            provider_used: ProviderUsed::None,
        }
    }
}

/// Answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<Source>,

    /// Internal: which stage answered, for logging only
    #[serde(skip_serializing, default)]
    pub provider: ProviderUsed,
}
