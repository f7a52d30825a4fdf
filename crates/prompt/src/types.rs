//! Prompt types for Lumina.
//!
//! This module defines the inputs of directive composition.

use serde::{Deserialize, Serialize};

/// A persona definition loaded from YAML.
///
/// The persona is opaque configuration: Lumina never interprets its text,
/// it only places it at the head of every directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDefinition {
    /// Unique persona identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Identity paragraph
    pub persona: String,

    /// Identity and behavior rules, rendered as a numbered list
    #[serde(default)]
    pub rules: Vec<String>,

    /// Formatting rules, rendered as a numbered list
    #[serde(default)]
    pub formatting: Vec<String>,
}

/// How the primary provider may answer, chosen per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Conversation history and built-in knowledge only
    #[default]
    Memory,
    /// Search grounding allowed, with fallback providers on failure
    Search,
}

impl RetrievalMode {
    /// Map the boolean "use web search" flag onto a mode.
    pub fn from_search_flag(use_search: bool) -> Self {
        if use_search {
            Self::Search
        } else {
            Self::Memory
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Search => "search",
        }
    }
}

/// Text of a linked page, quoted into the directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkContext<'a> {
    pub url: &'a str,
    pub text: &'a str,
    pub truncated: bool,
}
