//! Recommendation engine for the cask-recs workspace.
//!
//! This crate contains the orchestrator that routes each request to the
//! fast path or the agentic path, together with everything those paths
//! need: the response cache, the parser/validator chain, prompts, catalog
//! tools and configuration.

pub mod agentic;
pub mod backfill;
pub mod cache;
pub mod config;
pub mod error;
pub mod fast_path;
pub mod orchestrator;
pub mod preferences;
pub mod prompts;
pub mod response;
pub mod tools;
pub mod types;

pub use agentic::AgenticPath;
pub use cache::{cache_key, ResponseCache};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use fast_path::FastPathSelector;
pub use orchestrator::RecommendationOrchestrator;
pub use preferences::TastePreferences;
pub use response::{ParseFailure, ParseOutcome, ResponseParser};
pub use tools::CatalogTools;
pub use types::{
    Confidence, RecommendationItem, RecommendationRequest, RecommendationResult, ResolutionPath,
    BACKFILL_REASON,
};
