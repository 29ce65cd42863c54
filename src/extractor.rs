use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{Result, SummarizeError};
use crate::ExtractedPage;

/// Element kinds whose entire subtree is dropped before text is read.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "img", "iframe", "noscript", "svg", "canvas", "video", "audio", "source",
    "picture", "object",
];

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const ACCEPTED_CONTENT: &str = "text/html,application/xhtml+xml";

/// Fetches a single page and reduces it to title and visible body text.
pub struct Extractor {
    client: Client,
}

impl Extractor {
    /// The client carries no explicit timeout; only the completion call gets
    /// a bounded wait. The fetch relies on the transport's defaults.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPTED_CONTENT));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SummarizeError::Fetch(e.to_string()))?;

        Ok(Self { client })
    }

    /// Retrieve `url` and extract its readable content. One GET, no retry;
    /// a non-success status or an unreadable body is terminal.
    pub async fn extract(&self, url: &str) -> Result<ExtractedPage> {
        let url =
            Url::parse(url).map_err(|e| SummarizeError::Fetch(format!("invalid URL: {e}")))?;

        info!("fetching {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SummarizeError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| SummarizeError::Fetch(e.to_string()))?;

        let html = response
            .text()
            .await
            .map_err(|e| SummarizeError::Fetch(e.to_string()))?;

        let page = parse_page(&html, url.as_str());
        debug!(
            "extracted title {:?} and {} chars of body text",
            page.title,
            page.body_text.len()
        );
        Ok(page)
    }
}

/// Reduce an HTML document to its declared title and visible body text.
///
/// Text extraction walks the body subtree and skips non-content elements
/// wholesale, so their payloads never reach the output. Whitespace runs are
/// collapsed to single spaces and the result is trimmed.
pub fn parse_page(html: &str, url: &str) -> ExtractedPage {
    let doc = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let title = doc
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let body_selector = Selector::parse("body").unwrap();
    let mut raw = String::new();
    if let Some(body) = doc.select(&body_selector).next() {
        collect_visible_text(*body, &mut raw);
    }
    let body_text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    ExtractedPage {
        url: url.to_string(),
        title,
        body_text,
    }
}

fn collect_visible_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text.text),
        Node::Element(element) if NON_CONTENT_TAGS.contains(&element.name()) => {}
        _ => {
            for child in node.children() {
                collect_visible_text(child, out);
            }
        }
    }
}
