use std::time::Duration;

use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, SummarizeError};
use crate::ExtractedPage;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Hard prefix cut applied to the page text before it enters the prompt.
/// Character-counted, not content-aware; a mid-word cut at the boundary is
/// expected.
pub const MAX_WEB_PAGE_LENGTH: usize = 6000;

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f32 = 0.7;

pub const SITE_URL_TOKEN: &str = "{{TODO-ADD-SITE-URL}}";
pub const TITLE_TOKEN: &str = "{{TODO-ADD-WEBPAGE-TITLE}}";
pub const CONTENT_TOKEN: &str = "{{TODO-ADD-SUMMARY-CONTENT}}";
pub const STYLES_TOKEN: &str = "{{TODO-ADD-NECESARY-STYLES}}";

/// The fixed skeleton the model is instructed to fill. Only the four
/// placeholder tokens may change; the rest of the document is part of the
/// output contract and must survive byte-for-byte.
pub const OUTPUT_TEMPLATE: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Web Summary</title>
  <link href="https://fonts.googleapis.com/css2?family=Poppins:wght@400;600&display=swap" rel="stylesheet" />
  <style>
    body {
      margin: 0;
      font-family: 'Poppins', sans-serif;
      background-color: white;
      color: #333;
    }

    header {
      background-color: #000;
      color: #fff;
      padding: 1rem 2rem;
      font-size: 1.5rem;
    }

    main {
      padding: 2rem;
    }

    .url-label {
      font-size: 1rem;
      margin-bottom: 0.5rem;
      color: #666;
    }

    .url-label a {
      color: #007BFF;
      text-decoration: none;
    }

    .url-label a:hover {
      text-decoration: underline;
    }

    h2 {
      font-weight: 600;
      font-size: 1.8rem;
      margin-bottom: 1rem;
    }

    {{TODO-ADD-NECESARY-STYLES}}
  </style>
</head>
<body>
  <header>
    Webpage Summarizer
  </header>
  <main>
    <div class="url-label">
      <strong>URL:</strong> <a href="{{TODO-ADD-SITE-URL}}" target="_blank">{{TODO-ADD-SITE-URL}}</a>
    </div>
    <h2>{{TODO-ADD-WEBPAGE-TITLE}}</h2>
    <div class="content-area">
      {{TODO-ADD-SUMMARY-CONTENT}}
    </div>
  </main>
</body>
</html>
"#;

/// The two conversational turns sent to the completion endpoint. Built once
/// per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PromptPayload {
    pub system_instructions: String,
    pub user_message: String,
}

impl PromptPayload {
    pub fn new(page: &ExtractedPage) -> Self {
        let body: String = page.body_text.chars().take(MAX_WEB_PAGE_LENGTH).collect();
        let user_message = format!(
            "Summarize the following web page in HTML format.\n\n\
             Site URL: {}\n\n\
             Title: \"{}\"\n\n\
             Content:\n\n{}",
            page.url, page.title, body
        );

        Self {
            system_instructions: system_instructions(),
            user_message,
        }
    }
}

fn system_instructions() -> String {
    format!(
        "You are a helpful assistant that summarizes websites.\n\
         In the response talk as if you were a third party person describing what you see in \
         the site, not the author of the website.\n\
         Format your response in **valid HTML**.\n\
         Use the website language as the target language for the HTML file. If the site is in \
         Spanish, the summary should be in Spanish. If it is in English, it should be in English.\n\
         You have to strictly follow the following HTML template:\n\
         BEGINNING OF TEMPLATE\n\
         {template}\n\
         END OF TEMPLATE\n\
         You have to replace the {title} label with the webpage title, the {content} label with \
         the summary content including titles, subtitles, paragraphs, bullets and what you \
         consider (but avoid forms, links, buttons and user inputs), and replace the {styles} \
         label with the necessary styles for the {content} section.\n\
         Also replace the {url} label with the site url.\n\
         You do not have to change the rest of the template.\n\
         Generate just the HTML without ```html ... ```.",
        template = OUTPUT_TEMPLATE,
        title = TITLE_TOKEN,
        content = CONTENT_TOKEN,
        styles = STYLES_TOKEN,
        url = SITE_URL_TOKEN,
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

impl Message {
    fn system(content: String) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    fn user(content: String) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Builds the bounded prompt and obtains the model's reply.
pub struct Composer {
    client: Client,
    config: Config,
}

impl Composer {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .map_err(|e| SummarizeError::Completion(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Send one completion request for `page` and return the model's reply,
    /// trimmed. The reply is trusted verbatim; no markup validation happens
    /// here.
    pub async fn summarize(&self, page: &ExtractedPage) -> Result<String> {
        let payload = PromptPayload::new(page);
        debug!(
            "prompt sizes: system {} chars, user {} chars",
            payload.system_instructions.len(),
            payload.user_message.len()
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                Message::system(payload.system_instructions),
                Message::user(payload.user_message),
            ],
            temperature: TEMPERATURE,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|e| SummarizeError::Completion(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        info!("requesting summary from model {}", self.config.model);
        let response = self
            .client
            .post(OPENAI_API_URL)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Completion(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummarizeError::Completion(e.to_string()))?;

        if !status.is_success() {
            return Err(provider_error(status, &body));
        }
        extract_reply(&body)
    }
}

/// Surface the provider's own error message when the body carries one.
fn provider_error(status: StatusCode, body: &str) -> SummarizeError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { error: Some(err) }) => SummarizeError::Completion(err.message),
        _ => SummarizeError::Completion(format!("request failed with status {status}")),
    }
}

/// Pull the first choice's message content out of a completion response.
/// A body that deserializes but lacks the reply is still an error, even
/// though the transport call succeeded.
fn extract_reply(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SummarizeError::Completion(format!("unexpected response structure: {e}")))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| SummarizeError::Completion("response did not contain a reply".into()))?;

    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body_text: &str) -> ExtractedPage {
        ExtractedPage {
            url: "https://example.com/".into(),
            title: "Example".into(),
            body_text: body_text.into(),
        }
    }

    #[test]
    fn system_instructions_embed_template_verbatim() {
        let payload = PromptPayload::new(&page("Hello world"));
        assert!(payload.system_instructions.contains(OUTPUT_TEMPLATE));
        for token in [SITE_URL_TOKEN, TITLE_TOKEN, CONTENT_TOKEN, STYLES_TOKEN] {
            assert!(payload.system_instructions.contains(token), "missing {token}");
        }
    }

    #[test]
    fn template_carries_the_url_token_twice() {
        assert_eq!(OUTPUT_TEMPLATE.matches(SITE_URL_TOKEN).count(), 2);
        assert_eq!(OUTPUT_TEMPLATE.matches(TITLE_TOKEN).count(), 1);
        assert_eq!(OUTPUT_TEMPLATE.matches(CONTENT_TOKEN).count(), 1);
        assert_eq!(OUTPUT_TEMPLATE.matches(STYLES_TOKEN).count(), 1);
    }

    #[test]
    fn user_message_carries_url_title_and_body() {
        let payload = PromptPayload::new(&page("a short body"));
        assert!(payload.user_message.contains("https://example.com/"));
        assert!(payload.user_message.contains("\"Example\""));
        assert!(payload.user_message.ends_with("Content:\n\na short body"));
    }

    #[test]
    fn long_body_is_cut_to_the_first_n_chars() {
        let body = "x".repeat(MAX_WEB_PAGE_LENGTH) + "OVERFLOW";
        let payload = PromptPayload::new(&page(&body));
        assert!(!payload.user_message.contains("OVERFLOW"));
        let expected: String = body.chars().take(MAX_WEB_PAGE_LENGTH).collect();
        assert!(payload.user_message.ends_with(&expected));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let body = "é".repeat(MAX_WEB_PAGE_LENGTH) + "tail";
        let payload = PromptPayload::new(&page(&body));
        assert!(!payload.user_message.contains("tail"));
        assert!(payload.user_message.ends_with(&"é".repeat(MAX_WEB_PAGE_LENGTH)));
    }

    #[test]
    fn reply_extraction_reads_the_first_choice() {
        let body = serde_json::json!({
            "choices": [
                { "message": { "content": "  <html>first</html>\n" } },
                { "message": { "content": "<html>second</html>" } }
            ]
        })
        .to_string();
        assert_eq!(extract_reply(&body).unwrap(), "<html>first</html>");
    }

    #[test]
    fn reply_is_passed_through_unmodified() {
        let filled = OUTPUT_TEMPLATE
            .replace(SITE_URL_TOKEN, "https://example.com/")
            .replace(TITLE_TOKEN, "Example")
            .replace(CONTENT_TOKEN, "<p>Hello world</p>")
            .replace(STYLES_TOKEN, "");
        let body = serde_json::json!({
            "choices": [{ "message": { "content": filled } }]
        })
        .to_string();
        assert_eq!(extract_reply(&body).unwrap(), filled.trim());
    }

    #[test]
    fn missing_content_is_a_completion_error() {
        let body = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let err = extract_reply(body).unwrap_err();
        assert!(matches!(err, SummarizeError::Completion(_)));
    }

    #[test]
    fn empty_choices_is_a_completion_error() {
        let err = extract_reply(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, SummarizeError::Completion(_)));
    }

    #[test]
    fn non_json_body_is_a_completion_error() {
        let err = extract_reply("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, SummarizeError::Completion(_)));
    }

    #[test]
    fn provider_error_message_is_surfaced() {
        let body = r#"{"error":{"message":"model not found","type":"invalid_request_error"}}"#;
        let err = provider_error(StatusCode::NOT_FOUND, body);
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn opaque_error_body_falls_back_to_the_status() {
        let err = provider_error(StatusCode::BAD_GATEWAY, "upstream unhappy");
        assert!(err.to_string().contains("502"));
    }
}
