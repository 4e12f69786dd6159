//! Client for the language-model service.
//!
//! This crate is the only place the engine talks to an LLM. It provides:
//! - `LlmClient`: single-shot completions and tool-calling conversations
//! - `ToolExecutor`: the seam through which the model reaches catalog tools
//! - `OpenAiClient`: an HTTPS implementation with a concurrency limiter
//!
//! ## Example Usage
//! ```ignore
//! let client = OpenAiClient::new(OpenAiSettings {
//!     api_key: std::env::var("OPENAI_API_KEY")?,
//!     ..OpenAiSettings::default()
//! })?;
//! let text = client.complete(&CompletionRequest::json(prompt)).await?;
//! ```

pub mod conversation;
pub mod error;
pub mod openai;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use conversation::{run_tool_loop, ChatSettings, ChatTransport};
pub use error::{LlmError, Result};
pub use openai::{OpenAiClient, OpenAiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::{
    CompletionRequest, ConversationRequest, ToolCall, ToolSpec, Transcript, TranscriptEvent,
};

/// A language model the engine can ask for recommendations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One prompt in, the model's raw text out
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Run a conversation in which the model may call `tools`, bounded by
    /// the request's tool-call budget.
    async fn converse(
        &self,
        request: &ConversationRequest,
        tools: &dyn ToolExecutor,
    ) -> Result<Transcript>;
}

/// Executes tool calls on behalf of the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tools offered to the model
    fn manifest(&self) -> Vec<ToolSpec>;

    /// Execute one call and return its JSON output
    async fn execute(&self, call: &ToolCall) -> Result<Value>;
}
