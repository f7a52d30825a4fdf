//! Link crawler.
//!
//! Fetches one page and reduces it to visible text. A crawl never fails:
//! errors become the document text so the caller can always quote something.

use crate::types::CrawledDocument;
use lumina_core::config::CrawlerSettings;
use lumina_core::http::{build_client, ensure_success};
use lumina_core::{AppError, AppResult};
use scraper::{Html, Node};
use std::time::Duration;

/// Subtrees that never carry page content.
const SKIPPED_TAGS: [&str; 8] = [
    "script", "style", "nav", "header", "footer", "aside", "noscript", "template",
];

/// Upper bound on body bytes read before extraction.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Fetches a URL and returns its cleaned text.
#[async_trait::async_trait]
pub trait Crawler: Send + Sync {
    /// Crawl one URL. Must return within the crawler's timeout.
    async fn crawl(&self, url: &str) -> CrawledDocument;

    /// Character cap applied to document text.
    fn max_chars(&self) -> usize;
}

/// HTTP crawler with a hard timeout and a browser-like User-Agent.
#[derive(Debug, Clone)]
pub struct HttpCrawler {
    client: reqwest::Client,
    timeout: Duration,
    max_chars: usize,
}

impl HttpCrawler {
    pub fn new(settings: &CrawlerSettings) -> AppResult<Self> {
        Ok(Self {
            client: build_client(settings.timeout(), &settings.user_agent)?,
            timeout: settings.timeout(),
            max_chars: settings.max_chars,
        })
    }

    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?;
        let mut response = ensure_success(response).await?;

        if !declares_utf8(&response) {
            // reqwest decodes legacy charsets; the crawl timeout bounds this read
            let html = response.text().await?;
            return Ok(extract_text(&html));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() >= MAX_BODY_BYTES {
                tracing::debug!(url, "Body exceeds {} bytes, stopping read", MAX_BODY_BYTES);
                break;
            }
        }

        Ok(extract_text(&String::from_utf8_lossy(&body)))
    }
}

#[async_trait::async_trait]
impl Crawler for HttpCrawler {
    async fn crawl(&self, url: &str) -> CrawledDocument {
        tracing::info!(url, "Crawling linked page");

        let result = match tokio::time::timeout(self.timeout, self.fetch_text(url)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Transport(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        };

        match result {
            Ok(text) => {
                let doc = CrawledDocument::from_text(url, &text, self.max_chars);
                tracing::debug!(
                    url,
                    chars = doc.text.chars().count(),
                    truncated = doc.truncated,
                    "Crawled page"
                );
                doc
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Crawl failed");
                CrawledDocument::from_error(url, e, self.max_chars)
            }
        }
    }

    fn max_chars(&self) -> usize {
        self.max_chars
    }
}

/// Whether the body is UTF-8 (or undeclared, which is read as UTF-8).
fn declares_utf8(response: &reqwest::Response) -> bool {
    let charset = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_param);

    match charset {
        Some(charset) => matches!(charset.as_str(), "utf-8" | "utf8" | "us-ascii"),
        None => true,
    }
}

/// The lowercased `charset` parameter of a Content-Type value.
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

/// Visible text of an HTML document, whitespace-collapsed.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => pieces.push(&**text),
            Node::Element(element) if SKIPPED_TAGS.contains(&element.name()) => continue,
            _ => {}
        }
        // Reverse so the stack pops children in document order
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }

    pieces
        .iter()
        .flat_map(|piece| piece.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
