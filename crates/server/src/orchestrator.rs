//! Main orchestrator for the recommendation engine.
//!
//! Coordinates the flow: Validate → Classify → Route (fast / agentic) →
//! Fallback → Result.
//!
//! ## Architecture
//! ```text
//! request text ──► classify ──┬── simple ──► FastPathSelector ──────────────► result
//!                             └── complex ─► AgenticPath ──ok────────────────► result
//!                                                 └──err──► FastPathSelector ─► result
//! ```
//!
//! Only the request text is classified; preference context travels to the
//! model prompts untouched.
//!
//! `get_recommendation` never returns an error. Invalid requests, an
//! unreachable catalog and a failed fast-path LLM call come back as
//! `success = false`; everything else degrades to a usable result.

use crate::agentic::AgenticPath;
use crate::cache::ResponseCache;
use crate::config::{EngineConfig, LimitsConfig};
use crate::error::{EngineError, Result};
use crate::fast_path::FastPathSelector;
use crate::types::{RecommendationRequest, RecommendationResult, ResolutionPath};
use catalog::CatalogStore;
use llm_client::LlmClient;
use pipeline::classify;
use sources::{CandidateSampler, SamplePool};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Clones share the working set, the cache and the LLM client
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    fast: Arc<FastPathSelector>,
    agentic: Arc<AgenticPath>,
    limits: LimitsConfig,
}

impl RecommendationOrchestrator {
    /// Create a new orchestrator with all components initialized
    ///
    /// # Arguments
    /// * `store` - Catalog read interface
    /// * `llm` - LLM service used by both paths
    /// * `config` - Engine configuration
    ///
    /// Nothing is fetched here; the working set is drawn on first use.
    pub fn new(store: Arc<dyn CatalogStore>, llm: Arc<dyn LlmClient>, config: &EngineConfig) -> Self {
        let sampler = CandidateSampler::new()
            .with_pool_size(config.sampler.pool_size)
            .with_target(config.sampler.target);
        let pool = Arc::new(SamplePool::new(store, sampler));
        let cache = ResponseCache::new(config.cache.capacity, config.cache.ttl());

        let fast = FastPathSelector::new(Arc::clone(&pool), Arc::clone(&llm))
            .with_request_timeout(config.llm.request_timeout());
        let agentic = AgenticPath::new(pool, llm, cache)
            .with_max_tool_calls(config.llm.max_tool_calls)
            .with_conversation_timeout(config.llm.conversation_timeout())
            .with_resolve_scan_limit(config.agentic.resolve_scan_limit);

        Self {
            fast: Arc::new(fast),
            agentic: Arc::new(agentic),
            limits: config.limits.clone(),
        }
    }

    /// Main entry point: recommend `limit` items for `text`
    ///
    /// `limit` is clamped to the configured range (1..=20 by default).
    pub async fn get_recommendation(&self, text: &str, limit: usize) -> RecommendationResult {
        self.get_recommendation_for(RecommendationRequest::new(text, limit)).await
    }

    /// As `get_recommendation`, for a request that may carry preference context
    #[instrument(skip(self, request), fields(limit = request.limit))]
    pub async fn get_recommendation_for(&self, request: RecommendationRequest) -> RecommendationResult {
        let start_time = Instant::now();

        let result = match self.resolve(&request).await {
            Ok(result) => result,
            Err(e @ EngineError::InvalidRequest(_)) => {
                warn!("Rejected request: {}", e);
                RecommendationResult::failure(e.to_string())
            }
            Err(e) => {
                error!("Recommendation failed: {}", e);
                RecommendationResult::failure(e.to_string())
            }
        };

        info!(
            "Finished request via {:?}: success={}, {} items, {:.2?}",
            result.path,
            result.success,
            result.len(),
            start_time.elapsed()
        );
        result
    }

    async fn resolve(&self, request: &RecommendationRequest) -> Result<RecommendationResult> {
        if request.text.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "request text must not be empty".to_string(),
            ));
        }

        let limit = self.limits.clamp(request.limit);
        if limit != request.limit {
            debug!("Clamped limit {} to {}", request.limit, limit);
        }

        let text = request.query();
        let context = request.context();
        let signal = classify(text);
        info!(
            "Classified request: complex={}, {} flavor tags, {} indicators",
            signal.is_complex,
            signal.flavor_tags.len(),
            signal.indicator_count()
        );

        if !signal.is_complex {
            let result = self.fast.select_with_context(text, context, limit).await?;
            return Ok(result.with_path(ResolutionPath::Fast));
        }

        match self.agentic.recommend_with_context(text, context, limit).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!("Agentic path failed, falling back to fast path: {}", e);
                let result = self.fast.select_with_context(text, context, limit).await?;
                Ok(result.with_path(ResolutionPath::FastFallback))
            }
        }
    }

    pub fn pool(&self) -> &Arc<SamplePool> {
        self.fast.pool()
    }

    pub fn cache(&self) -> &ResponseCache {
        self.agentic.cache()
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }
}
