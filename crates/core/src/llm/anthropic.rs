use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{CompletionRequest, LlmClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    /// Builds a client for `api_key`, taking model/endpoint/timeout from `settings`.
    pub fn new(api_key: &str, settings: &Settings) -> anyhow::Result<Self> {
        let api_key = api_key.trim();
        anyhow::ensure!(!api_key.is_empty(), "Anthropic API key must be non-empty");

        let timeout_secs = settings
            .anthropic_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: settings
                .anthropic_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: settings
                .anthropic_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn create_message(
        &self,
        req: CreateMessageRequest,
    ) -> anyhow::Result<CreateMessageResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).context("API key is not a valid header value")?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            let detail = raw_response_json
                .as_ref()
                .and_then(api_error_message)
                .map(|msg| format!("status={status}: {msg}"))
                .unwrap_or_else(|| format!("status={status}"));
            return Err(LlmDiagnosticsError {
                provider: Provider::Anthropic,
                stage: "http",
                detail,
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        serde_json::from_str::<CreateMessageResponse>(&text)
            .with_context(|| format!("failed to decode Anthropic response JSON: {text}"))
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            match block {
                ContentBlock::Text { text } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
                ContentBlock::Unknown => {}
            }
        }
        out
    }
}

/// Pulls `error.message` out of an Anthropic error body.
fn api_error_message(body: &serde_json::Value) -> Option<String> {
    body.get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let res = self
            .create_message(CreateMessageRequest {
                model: self.model.clone(),
                max_tokens: req.max_tokens,
                messages: vec![Message {
                    role: "user",
                    content: req.prompt,
                }],
            })
            .await?;

        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(
                model = %self.model,
                max_tokens = req.max_tokens,
                "Anthropic stop_reason=max_tokens; reply may be truncated"
            );
        }

        let text = Self::response_text(&res);
        if text.trim().is_empty() {
            return Err(LlmDiagnosticsError {
                provider: Provider::Anthropic,
                stage: "parse_empty_reply",
                detail: "response contained no text blocks".to_string(),
                raw_output: None,
                raw_response_json: None,
            }
            .into());
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers exactly one request with `status` and a JSON `body`.
    async fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> AnthropicClient {
        let settings = Settings {
            anthropic_base_url: Some(base_url),
            anthropic_timeout_secs: Some(5),
            ..Settings::default()
        };
        AnthropicClient::new("sk-test", &settings).unwrap()
    }

    fn prompt() -> CompletionRequest {
        CompletionRequest {
            prompt: "hello".to_string(),
            max_tokens: 16,
        }
    }

    #[tokio::test]
    async fn non_success_status_keeps_status_and_body() {
        let body = json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })
        .to_string();
        let client = client_for(serve_once("401 Unauthorized", body.clone()).await);

        let err = client.complete(prompt()).await.unwrap_err();
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, "http");
        assert!(diag.detail.contains("401"), "{}", diag.detail);
        assert!(diag.detail.contains("invalid x-api-key"));
        assert_eq!(diag.raw_output.as_deref(), Some(body.as_str()));
        assert!(diag.raw_response_json.is_some());
        assert!(!diag.is_parse_failure());
    }

    #[tokio::test]
    async fn reply_without_text_blocks_is_rejected() {
        let body = json!({
            "content": [{"type": "thinking", "thinking": "..."}],
            "stop_reason": "end_turn"
        })
        .to_string();
        let client = client_for(serve_once("200 OK", body).await);

        let err = client.complete(prompt()).await.unwrap_err();
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, "parse_empty_reply");
        assert!(diag.is_parse_failure());
    }

    #[tokio::test]
    async fn truncated_reply_is_still_returned() {
        let body = json!({
            "content": [{"type": "text", "text": "{\"ticker\": \"AC"}],
            "stop_reason": "max_tokens"
        })
        .to_string();
        let client = client_for(serve_once("200 OK", body).await);

        let text = client.complete(prompt()).await.unwrap();
        assert_eq!(text, "{\"ticker\": \"AC");
    }

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let res: CreateMessageResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Here you go:"},
                {"type": "server_tool_use", "id": "x"},
                {"type": "text", "text": "{\"ticker\": \"ACME\"}"}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        assert_eq!(
            AnthropicClient::response_text(&res),
            "Here you go:\n{\"ticker\": \"ACME\"}"
        );
    }

    #[test]
    fn request_serializes_messages_api_shape() {
        let req = CreateMessageRequest {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4000,
            messages: vec![Message {
                role: "user",
                content: "hello".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "model": DEFAULT_MODEL,
                "max_tokens": 4000,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn extracts_api_error_message() {
        let body = json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}});
        assert_eq!(api_error_message(&body).as_deref(), Some("invalid x-api-key"));
        assert_eq!(api_error_message(&json!({"oops": true})), None);
    }

    #[test]
    fn new_rejects_blank_key_and_applies_overrides() {
        let mut settings = Settings::default();
        assert!(AnthropicClient::new("   ", &settings).is_err());

        settings.anthropic_model = Some("claude-test".to_string());
        let client = AnthropicClient::new("sk-test", &settings).unwrap();
        assert_eq!(client.model(), "claude-test");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
