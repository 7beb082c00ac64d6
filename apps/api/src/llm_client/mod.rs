/// Chat-completion client. Every model call in the service goes through here.
///
/// No other module talks to the completion API directly. The endpoint is any
/// OpenAI-compatible `/chat/completions` (Groq by default). Calls are never
/// retried: a failure is reported to the caller, who decides on a fallback.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned no JSON {0}")]
    NoJson(&'static str),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as the single user message and returns the trimmed reply text.
    pub async fn complete(
        &self,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Parses the outermost `{...}` span of `text`.
pub fn parse_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let span = extract_json_span(text, '{', '}').ok_or(LlmError::NoJson("object"))?;
    Ok(serde_json::from_str(span)?)
}

/// Parses the outermost `[...]` span of `text`.
pub fn parse_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, LlmError> {
    let span = extract_json_span(text, '[', ']').ok_or(LlmError::NoJson("array"))?;
    Ok(serde_json::from_str(span)?)
}

/// The slice from the first `open` to the last `close`, fences and chatter ignored.
pub fn extract_json_span(text: &str, open: char, close: char) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_span_ignores_surrounding_chatter() {
        let reply = "Sure! Here you go:\n[\"Rust\", \"SQL\"]\nLet me know if you need more.";
        assert_eq!(extract_json_span(reply, '[', ']'), Some("[\"Rust\", \"SQL\"]"));
        assert_eq!(extract_json_span("no json here", '{', '}'), None);
        assert_eq!(extract_json_span("} backwards {", '{', '}'), None);
    }

    #[test]
    fn test_parse_helpers() {
        let tips: Vec<String> = parse_array("```json\n[\"a\", \"b\"]\n```").unwrap();
        assert_eq!(tips, vec!["a", "b"]);

        let value: Value = parse_object("Result: {\"score\": 81, \"nested\": {\"x\": 1}} done").unwrap();
        assert_eq!(value["score"], 81);
        assert_eq!(value["nested"]["x"], 1);

        assert!(matches!(parse_array::<String>("{}"), Err(LlmError::NoJson("array"))));
        assert!(matches!(parse_object::<Value>("{oops}"), Err(LlmError::Parse(_))));
    }

    async fn fake_completions(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(move |Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(request["model"], "test-model");
                    assert_eq!(request["messages"][0]["role"], "user");
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/chat/completions")
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let url = fake_completions(
            StatusCode::OK,
            json!({
                "choices": [{ "message": { "role": "assistant", "content": "  Polished text.\n" } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
            }),
        )
        .await;
        let llm = LlmClient::new(url, "key", "test-model").unwrap();

        let text = llm.complete("hello", CompletionOptions::default()).await.unwrap();
        assert_eq!(text, "Polished text.");
    }

    #[tokio::test]
    async fn test_complete_reports_api_errors_without_retry() {
        let url = fake_completions(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "rate limit reached" } }),
        )
        .await;
        let llm = LlmClient::new(url, "key", "test-model").unwrap();

        let err = llm.complete("hello", CompletionOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Api { status: 429, ref message } if message == "rate limit reached"
        ));
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_content() {
        let url = fake_completions(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "   " } }] }),
        )
        .await;
        let llm = LlmClient::new(url, "key", "test-model").unwrap();

        assert!(matches!(
            llm.complete("hello", CompletionOptions::default()).await,
            Err(LlmError::EmptyContent)
        ));
    }
}
