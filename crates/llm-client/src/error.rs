//! Errors that can occur when talking to the LLM service.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to reach LLM service: {0}")]
    Connection(String),

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM service rejected credentials: {0}")]
    Auth(String),

    #[error("LLM service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Invalid response from LLM service: {0}")]
    InvalidResponse(String),

    #[error("Tool-call budget of {limit} exceeded")]
    ToolBudgetExceeded { limit: usize },

    #[error("Tool {tool} failed: {reason}")]
    Tool { tool: String, reason: String },
}

impl LlmError {
    /// Transport-level failures: the service could not be reached or did not answer in time
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LlmError::Connection(_) | LlmError::Timeout(_) | LlmError::Auth(_) | LlmError::Status { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
