//! Generation response model.
//!
//! Every field read by callers is optional or defaulted, so a response that
//! omits a field deserializes into an "empty" value instead of failing.

use serde::{Deserialize, Serialize};

/// Response of a text-generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    /// Generated candidates (possibly empty)
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Prompt-level feedback, present when the whole prompt was blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl LlmResponse {
    /// Build a response holding one plain text candidate.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent {
                    role: Some("model".to_string()),
                    parts: vec![ContentPart {
                        text: Some(text.into()),
                    }],
                }),
                finish_reason: Some(FinishReason::STOP.to_string()),
                grounding_metadata: None,
            }],
            prompt_feedback: None,
        }
    }

    /// First non-empty text of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates.first().and_then(Candidate::text)
    }
}

/// Prompt-level feedback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// A single generated candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,

    /// Termination reason as sent by the provider (e.g. "STOP", "RECITATION")
    #[serde(default)]
    pub finish_reason: Option<String>,

    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

impl Candidate {
    /// The first non-empty text part.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .find(|t| !t.trim().is_empty())
    }

    /// Whether the provider stopped this candidate for policy reasons.
    pub fn is_policy_blocked(&self) -> bool {
        self.finish_reason
            .as_deref()
            .map(FinishReason::is_policy_block)
            .unwrap_or(false)
    }

    /// All grounding references (chunks first, then attributions).
    pub fn grounding_refs(&self) -> impl Iterator<Item = &WebRef> {
        self.grounding_metadata
            .iter()
            .flat_map(|g| g.grounding_chunks.iter().chain(&g.grounding_attributions))
            .filter_map(|entry| entry.web.as_ref())
    }
}

/// Candidate content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

/// One part of candidate content. Only text parts are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Grounding metadata attached to a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingEntry>,

    #[serde(default)]
    pub grounding_attributions: Vec<GroundingEntry>,
}

/// A grounding chunk or attribution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingEntry {
    #[serde(default)]
    pub web: Option<WebRef>,
}

/// Web page referenced by a grounding entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRef {
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
}

impl WebRef {
    /// Both uri and title, when both are present and non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        let uri = self.uri.as_deref().filter(|u| !u.is_empty())?;
        let title = self.title.as_deref().filter(|t| !t.is_empty())?;
        Some((uri, title))
    }
}

/// Known termination reasons.
pub struct FinishReason;

impl FinishReason {
    pub const STOP: &'static str = "STOP";

    /// Reasons meaning the provider declined to answer.
    pub const POLICY_BLOCKS: [&'static str; 5] = [
        "RECITATION",
        "SAFETY",
        "BLOCKLIST",
        "PROHIBITED_CONTENT",
        "SPII",
    ];

    pub fn is_policy_block(reason: &str) -> bool {
        Self::POLICY_BLOCKS
            .iter()
            .any(|r| r.eq_ignore_ascii_case(reason))
    }
}

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
        }
    }
}
