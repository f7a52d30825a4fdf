//! Instant-answer fallback backed by the DuckDuckGo API.

use super::{FallbackProvider, ProviderAnswer};
use crate::types::{ProviderUsed, Source};
use lumina_core::config::FallbackSettings;
use lumina_core::http::ensure_success;
use lumina_core::{AppError, AppResult};
use serde::Deserialize;

const DEFAULT_HEADING: &str = "DuckDuckGo Result";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    heading: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

// Topic groups carry no Text/FirstURL and deserialize to empty strings
#[derive(Debug, Default, Deserialize)]
struct RelatedTopic {
    #[serde(default, rename = "Text")]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
}

impl InstantAnswer {
    /// Abstract text and its URL, falling back to the first related topic.
    fn best_abstract(&self) -> Option<(&str, &str)> {
        if !self.abstract_text.trim().is_empty() {
            return Some((self.abstract_text.as_str(), self.abstract_url.as_str()));
        }
        self.related_topics
            .first()
            .filter(|t| !t.text.trim().is_empty())
            .map(|t| (t.text.as_str(), t.first_url.as_str()))
    }

    fn heading(&self) -> &str {
        if self.heading.trim().is_empty() {
            DEFAULT_HEADING
        } else {
            &self.heading
        }
    }
}

/// Answers from the DuckDuckGo abstract for the query.
pub struct InstantAnswerProvider {
    http: reqwest::Client,
    api_base: String,
}

impl InstantAnswerProvider {
    pub fn new(http: reqwest::Client, settings: &FallbackSettings) -> Self {
        Self {
            http,
            api_base: settings.duckduckgo_api.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl FallbackProvider for InstantAnswerProvider {
    fn kind(&self) -> ProviderUsed {
        ProviderUsed::InstantAnswer
    }

    async fn attempt(&self, query: &str) -> AppResult<Option<ProviderAnswer>> {
        let response = self
            .http
            .get(format!("{}/", self.api_base))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;
        let bytes = ensure_success(response).await?.bytes().await?;

        let answer: InstantAnswer = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Malformed(format!("DuckDuckGo response: {}", e)))?;

        let Some((text, url)) = answer.best_abstract() else {
            tracing::debug!(query, "DuckDuckGo returned no abstract");
            return Ok(None);
        };

        let heading = answer.heading();
        let sources = if url.is_empty() {
            Vec::new()
        } else {
            vec![Source::new(format!("DuckDuckGo: {}", heading), url)]
        };

        Ok(Some(ProviderAnswer {
            text: format!("Here is a summary from DuckDuckGo:\n\n**{}**\n{}", heading, text),
            sources,
        }))
    }
}
