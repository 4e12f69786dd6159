//! HTTP client for OpenAI-compatible chat completion services.

use crate::conversation::{
    run_tool_loop, ChatMessage, ChatRequest, ChatResponse, ChatSettings, ChatTransport,
    ResponseFormat,
};
use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, ConversationRequest, Transcript};
use crate::{LlmClient, ToolExecutor};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Connection and model settings for `OpenAiClient`
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Per-HTTP-request timeout
    pub request_timeout: Duration,
    /// Maximum number of requests in flight at once
    pub max_concurrent_calls: usize,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(30),
            max_concurrent_calls: 4,
        }
    }
}

/// LLM client speaking the chat completions protocol over HTTPS.
///
/// Cloning is cheap: the HTTP connection pool and the concurrency limiter
/// are shared between clones.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    settings: OpenAiSettings,
    limiter: Arc<Semaphore>,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| LlmError::Connection(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "LLM client for {} (model {}, {} concurrent calls)",
            settings.base_url, settings.model, settings.max_concurrent_calls
        );

        Ok(Self {
            http,
            limiter: Arc::new(Semaphore::new(settings.max_concurrent_calls.max(1))),
            settings,
        })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatTransport for OpenAiClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatMessage> {
        if self.settings.api_key.trim().is_empty() {
            return Err(LlmError::Auth("no API key configured".to_string()));
        }

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| LlmError::Connection("request limiter closed".to_string()))?;

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.settings.request_timeout)
                } else {
                    error!("LLM request failed: {}", e);
                    LlmError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Auth(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("LLM service returned {}: {}", status, body);
            return Err(LlmError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        debug!("LLM finish reason: {:?}", choice.finish_reason);
        Ok(choice.message)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[instrument(skip(self, request), fields(prompt_len = request.prompt.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let chat = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            temperature: self.settings.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then(ResponseFormat::json_object),
            tools: Vec::new(),
        };

        let message = self.send(&chat).await?;
        Ok(message.content.unwrap_or_default())
    }

    #[instrument(skip_all, fields(max_tool_calls = request.max_tool_calls))]
    async fn converse(
        &self,
        request: &ConversationRequest,
        tools: &dyn ToolExecutor,
    ) -> Result<Transcript> {
        run_tool_loop(self, &self.chat_settings(), request, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = OpenAiClient::new(OpenAiSettings {
            base_url: "http://localhost:8080/v1/".into(),
            ..OpenAiSettings::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_auth_error() {
        let client = OpenAiClient::new(OpenAiSettings::default()).unwrap();
        let err = client
            .complete(&CompletionRequest::json("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Auth(_)));
        assert!(err.is_transport());
    }
}
