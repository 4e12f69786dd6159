//! Engine error taxonomy.
//!
//! Only `InvalidRequest` and `CatalogUnavailable` (and a transport failure on
//! the fast path) ever reach the caller, and even those arrive as an
//! unsuccessful `RecommendationResult`, never as an `Err`.

use catalog::CatalogError;
use llm_client::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("LLM transport failure: {0}")]
    LlmTransport(#[source] LlmError),

    #[error("Malformed LLM output: {0}")]
    MalformedOutput(String),

    #[error("Agentic path failed: {0}")]
    AgenticFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        EngineError::CatalogUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
