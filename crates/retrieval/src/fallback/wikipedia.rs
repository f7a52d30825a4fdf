//! Knowledge-base fallback: Wikipedia search plus summary synthesis.

use super::{FallbackProvider, ProviderAnswer};
use crate::types::{ProviderUsed, Source};
use futures::future::join_all;
use lumina_core::config::FallbackSettings;
use lumina_core::http::ensure_success;
use lumina_core::{AppError, AppResult};
use lumina_llm::{LlmClient, LlmRequest};
use lumina_prompt::synthesis_prompt;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;

const MISSING_EXTRACT: &str = "No summary available.";
const CONTEXT_HEADER: &str = "Here is information gathered from Wikipedia:\n\n";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: SearchQuery,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PageUrls>,
}

#[derive(Debug, Default, Deserialize)]
struct PageUrls {
    #[serde(default)]
    page: Option<String>,
}

/// One summarized article.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Article {
    title: String,
    extract: String,
    url: String,
}

/// Searches Wikipedia, summarizes the top hits, and asks the generative
/// provider to answer from those summaries alone.
pub struct WikipediaProvider {
    http: reqwest::Client,
    api_base: String,
    rest_base: String,
    top_n: usize,
    llm: Arc<dyn LlmClient>,
}

impl WikipediaProvider {
    pub fn new(http: reqwest::Client, settings: &FallbackSettings, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            http,
            api_base: settings.wikipedia_api.trim_end_matches('/').to_string(),
            rest_base: settings.wikipedia_rest.trim_end_matches('/').to_string(),
            top_n: settings.top_n,
            llm,
        }
    }

    async fn search_titles(&self, query: &str) -> AppResult<Vec<String>> {
        let limit = self.top_n.to_string();
        let response = self
            .http
            .get(format!("{}/w/api.php", self.api_base))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await?;
        let bytes = ensure_success(response).await?.bytes().await?;

        let parsed: SearchResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Malformed(format!("Wikipedia search response: {}", e)))?;

        Ok(parsed
            .query
            .search
            .into_iter()
            .take(self.top_n)
            .map(|hit| hit.title)
            .collect())
    }

    fn summary_url(&self, title: &str) -> AppResult<Url> {
        let slug = title.replace(' ', "_");
        let mut url = Url::parse(&self.rest_base)
            .map_err(|e| AppError::Config(format!("Invalid Wikipedia REST base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Cannot append path to {}", self.rest_base)))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "summary", slug.as_str()]);
        Ok(url)
    }

    fn article_fallback_url(&self, title: &str) -> String {
        format!("{}/wiki/{}", self.rest_base, title.replace(' ', "_"))
    }

    async fn fetch_summary(&self, title: String) -> AppResult<Article> {
        let url = self.summary_url(&title)?;
        let response = self.http.get(url).send().await?;
        let bytes = ensure_success(response).await?.bytes().await?;

        let summary: SummaryResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Malformed(format!("Wikipedia summary for {}: {}", title, e)))?;

        let extract = summary
            .extract
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| MISSING_EXTRACT.to_string());
        let url = summary
            .content_urls
            .and_then(|u| u.desktop)
            .and_then(|d| d.page)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.article_fallback_url(&title));

        Ok(Article {
            title,
            extract,
            url,
        })
    }
}

/// Context block handed to the synthesis prompt.
fn build_context(articles: &[Article]) -> String {
    let mut context = String::from(CONTEXT_HEADER);
    for article in articles {
        context.push_str(&format!(
            "--- TITLE: {} ---\n{}\n\n",
            article.title, article.extract
        ));
    }
    context
}

#[async_trait::async_trait]
impl FallbackProvider for WikipediaProvider {
    fn kind(&self) -> ProviderUsed {
        ProviderUsed::KnowledgeBase
    }

    async fn attempt(&self, query: &str) -> AppResult<Option<ProviderAnswer>> {
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            tracing::debug!(query, "Wikipedia search returned no articles");
            return Ok(None);
        }

        let articles = join_all(titles.into_iter().map(|t| self.fetch_summary(t)))
            .await
            .into_iter()
            .collect::<AppResult<Vec<_>>>()?;
        tracing::debug!(articles = articles.len(), "Fetched Wikipedia summaries");

        let prompt = synthesis_prompt("Wikipedia", query, &build_context(&articles))?;
        let response = self.llm.generate(&LlmRequest::single(prompt)).await?;

        let Some(text) = response.first_text().filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };

        let sources = articles
            .into_iter()
            .map(|a| Source::new(format!("Wikipedia: {}", a.title), a.url))
            .collect();

        Ok(Some(ProviderAnswer {
            text: text.to_string(),
            sources,
        }))
    }
}
