//! Request and transcript types shared by every `LlmClient` implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single-shot completion: one prompt in, raw text out.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    /// Ask the service to constrain its output to one JSON object
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            json_mode: true,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A tool-calling conversation.
#[derive(Debug, Clone)]
pub struct ConversationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Hard cap on tool executions over the whole conversation
    pub max_tool_calls: usize,
}

impl ConversationRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tool_calls: 2,
        }
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }
}

/// One tool the model may call, described with a JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// A tool was executed on the model's behalf
    Execute {
        tool: String,
        arguments: Value,
        output: Value,
    },
    /// Text produced by the model
    Describe { text: String },
}

/// Ordered record of a tool-calling conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub events: Vec<TranscriptEvent>,
}

impl Transcript {
    pub fn push(&mut self, event: TranscriptEvent) {
        self.events.push(event);
    }

    /// Text of the last describe event, which carries the final answer
    pub fn final_text(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            TranscriptEvent::Describe { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of tools executed during the conversation
    pub fn tool_call_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TranscriptEvent::Execute { .. }))
            .count()
    }

    /// Outputs of every tool execution, in order
    pub fn tool_outputs(&self) -> impl Iterator<Item = &Value> {
        self.events.iter().filter_map(|event| match event {
            TranscriptEvent::Execute { output, .. } => Some(output),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_final_text_is_last_describe() {
        let mut transcript = Transcript::default();
        transcript.push(TranscriptEvent::Describe { text: "thinking".into() });
        transcript.push(TranscriptEvent::Execute {
            tool: "get_items_by_origin".into(),
            arguments: json!({ "origin": "Japan" }),
            output: json!([{ "id": "W1" }]),
        });
        transcript.push(TranscriptEvent::Describe { text: "{\"ids\":[\"W1\"]}".into() });

        assert_eq!(transcript.final_text(), Some("{\"ids\":[\"W1\"]}"));
        assert_eq!(transcript.tool_call_count(), 1);
        assert_eq!(transcript.tool_outputs().count(), 1);
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::default();
        assert!(transcript.final_text().is_none());
        assert_eq!(transcript.tool_call_count(), 0);
    }
}
