//! Request analysis and candidate filtering for the recommendation engine.
//!
//! This crate provides:
//! - The Complexity Classifier that routes requests to the fast or agentic path
//! - QueryConstraints extracted from request text
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - RelevanceScorer for ranking backfill candidates
//!
//! ## Architecture
//! The fast path processes its working set in stages:
//! 1. `QueryConstraints::parse` reads price, flavor and origin hints
//! 2. Filters narrow the working set to matching candidates
//! 3. After the model has chosen, RelevanceScorer ranks what is left for backfill
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{classify, FilterPipeline, QueryConstraints};
//!
//! let signal = classify(text);
//! if !signal.is_complex {
//!     let constraints = QueryConstraints::parse(text);
//!     let filtered = FilterPipeline::standard().apply(pool.to_vec(), &constraints)?;
//! }
//! ```

pub mod complexity;
pub mod constraints;
pub mod filter_pipeline;
pub mod filters;
pub mod relevance;
pub mod traits;

// Re-export main types
pub use complexity::{classify, ComplexityIndicators, ComplexitySignal, ConditionMentions, FlavorTag};
pub use constraints::{FlavorRule, PriceBounds, QueryConstraints};
pub use filter_pipeline::FilterPipeline;
pub use relevance::{RelevanceHints, RelevanceScorer};
pub use traits::Filter;
