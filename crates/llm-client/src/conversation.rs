//! Chat wire format and the tool-calling loop.
//!
//! The loop is written against `ChatTransport` so it can be driven by the
//! HTTP client in production and by a scripted transport in tests.
//!
//! ## Algorithm
//! 1. Send system + user messages together with the tool manifest
//! 2. If the reply requests tools, execute them through the caller's
//!    `ToolExecutor`, append the results and ask again
//! 3. Once the budget is spent, ask again without tools so the model must answer
//! 4. A reply without tool calls ends the conversation

use crate::error::{LlmError, Result};
use crate::types::{ConversationRequest, ToolCall, ToolSpec, Transcript, TranscriptEvent};
use crate::ToolExecutor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

// =============================================================================
// Wire types (OpenAI-compatible chat completions)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text("assistant", content)
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn requested_calls(&self) -> &[WireToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded argument object, as the service sends it
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ToolSpec,
}

impl From<&ToolSpec> for WireTool {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            kind: function_kind(),
            function: spec.clone(),
        }
    }
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

// =============================================================================
// Transport + loop
// =============================================================================

/// Sends one chat request and returns the first choice's message.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatMessage>;
}

/// Model settings applied to every request of a conversation
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
}

/// Run a tool-calling conversation to completion.
pub async fn run_tool_loop(
    transport: &dyn ChatTransport,
    settings: &ChatSettings,
    request: &ConversationRequest,
    tools: &dyn ToolExecutor,
) -> Result<Transcript> {
    let manifest: Vec<WireTool> = tools.manifest().iter().map(WireTool::from).collect();
    let mut messages = vec![
        ChatMessage::system(request.system_prompt.clone()),
        ChatMessage::user(request.user_prompt.clone()),
    ];
    let mut transcript = Transcript::default();
    let mut executed = 0usize;

    // Every round that requests tools spends at least one call, so the
    // budget plus one final answer bounds the number of rounds.
    for round in 0..=request.max_tool_calls {
        let budget_left = request.max_tool_calls - executed;
        let chat = ChatRequest {
            model: settings.model.clone(),
            messages: messages.clone(),
            temperature: settings.temperature,
            max_tokens: None,
            response_format: None,
            tools: if budget_left > 0 { manifest.clone() } else { Vec::new() },
        };

        let reply = transport.send(&chat).await?;
        let calls = reply.requested_calls().to_vec();

        if calls.is_empty() {
            let text = reply.content.clone().unwrap_or_default();
            debug!("Conversation finished after {} rounds, {} tool calls", round + 1, executed);
            transcript.push(TranscriptEvent::Describe { text });
            return Ok(transcript);
        }

        if calls.len() > budget_left {
            warn!(
                "Model requested {} tool calls with {} left in budget",
                calls.len(),
                budget_left
            );
            return Err(LlmError::ToolBudgetExceeded {
                limit: request.max_tool_calls,
            });
        }

        if let Some(text) = reply.content.as_deref().filter(|t| !t.trim().is_empty()) {
            transcript.push(TranscriptEvent::Describe {
                text: text.to_string(),
            });
        }
        messages.push(reply);

        for call in calls {
            let arguments: Value = serde_json::from_str(&call.function.arguments).map_err(|e| {
                LlmError::InvalidResponse(format!(
                    "arguments for {} are not JSON: {}",
                    call.function.name, e
                ))
            })?;
            let tool_call = ToolCall {
                name: call.function.name.clone(),
                arguments: arguments.clone(),
            };

            debug!("Executing tool {} with {}", tool_call.name, arguments);
            let output = tools.execute(&tool_call).await?;
            executed += 1;

            messages.push(ChatMessage::tool_result(call.id.clone(), output.to_string()));
            transcript.push(TranscriptEvent::Execute {
                tool: tool_call.name,
                arguments,
                output,
            });
        }
    }

    Err(LlmError::InvalidResponse(
        "conversation ended without a final answer".to_string(),
    ))
}
