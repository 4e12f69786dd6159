//! Fast-Path Selector
//!
//! One bounded LLM call over a locally narrowed candidate list.
//!
//! ## Algorithm
//! 1. Parse price / flavor / origin constraints from the request
//! 2. Filter the working set; if too few survive, drop the filters and widen
//!    to the head of the working set
//! 3. Cap the candidate list and send its slim view to the model
//! 4. Parse the reply through the strategy chain
//! 5. Backfill any short result except the static defaults
//!
//! Preference context only reaches the prompt; constraints, filtering and
//! backfill ranking read the request text alone.
//!
//! ## Example Usage
//! ```ignore
//! let selector = FastPathSelector::new(pool, llm);
//! let result = selector.select("부드러운 위스키 추천해줘", 5).await?;
//! ```

use crate::backfill::backfill;
use crate::error::{EngineError, Result};
use crate::prompts::{fast_path_prompt, CandidateView};
use crate::response::{ParseContext, ResponseParser};
use crate::types::RecommendationResult;
use catalog::{CatalogItem, ItemId};
use llm_client::{CompletionRequest, LlmClient, LlmError};
use pipeline::{FilterPipeline, QueryConstraints};
use sources::SamplePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

const MIN_FILTERED: f64 = 10.0;
const MIN_WIDENED: usize = 20;
const MIN_CANDIDATES: usize = 15;

/// Completion budget: 150 tokens per item plus 500 for the envelope
pub fn max_tokens(limit: usize) -> u32 {
    (limit as u32 * 150 + 500).max(1000)
}

pub struct FastPathSelector {
    pool: Arc<SamplePool>,
    llm: Arc<dyn LlmClient>,
    filters: FilterPipeline,
    parser: ResponseParser,
    request_timeout: Duration,
}

impl FastPathSelector {
    pub fn new(pool: Arc<SamplePool>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            pool,
            llm,
            filters: FilterPipeline::standard(),
            parser: ResponseParser::standard(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn pool(&self) -> &Arc<SamplePool> {
        &self.pool
    }

    /// Filtered, widened and capped candidates for `query`
    pub fn narrow_candidates(&self, query: &str, pool: &[CatalogItem], limit: usize) -> Vec<CatalogItem> {
        let constraints = QueryConstraints::parse(query);
        debug!("Fast path constraints: {:?}", constraints);

        let filtered = match self.filters.apply(pool.to_vec(), &constraints) {
            Ok(items) => items,
            Err(e) => {
                warn!("Filter pipeline failed, continuing unfiltered: {:#}", e);
                pool.to_vec()
            }
        };

        let floor = (limit as f64 * 1.5).max(MIN_FILTERED);
        let mut candidates = if (filtered.len() as f64) < floor {
            let widen = MIN_WIDENED.max(limit * 2);
            info!(
                "Only {} items passed the filters (need {}), widening to the first {} of the working set",
                filtered.len(),
                floor,
                widen
            );
            pool.iter().take(widen).cloned().collect()
        } else {
            filtered
        };

        candidates.truncate(MIN_CANDIDATES.max((limit as f64 * 1.5).floor() as usize));
        candidates
    }

    pub async fn select(&self, query: &str, limit: usize) -> Result<RecommendationResult> {
        self.select_with_context(query, None, limit).await
    }

    #[instrument(skip(self, context))]
    pub async fn select_with_context(
        &self,
        query: &str,
        context: Option<&str>,
        limit: usize,
    ) -> Result<RecommendationResult> {
        let start = Instant::now();

        let pool = self.pool.get().await?;
        let candidates = self.narrow_candidates(query, &pool, limit);
        info!(
            "Fast path: {} candidates from a working set of {} ({:.2?})",
            candidates.len(),
            pool.len(),
            start.elapsed()
        );

        let view: Vec<CandidateView> = candidates.iter().map(CandidateView::from).collect();
        let request = CompletionRequest::json(fast_path_prompt(query, context, &view, limit))
            .with_max_tokens(max_tokens(limit));

        let llm_start = Instant::now();
        let raw = tokio::time::timeout(self.request_timeout, self.llm.complete(&request))
            .await
            .map_err(|_| EngineError::LlmTransport(LlmError::Timeout(self.request_timeout)))?
            .map_err(EngineError::LlmTransport)?;
        info!("Fast path LLM call finished in {:.2?}", llm_start.elapsed());

        let by_id: HashMap<ItemId, CatalogItem> = candidates
            .iter()
            .map(|item| (item.id.clone(), item.clone()))
            .collect();
        let ctx = ParseContext {
            limit,
            candidates: &by_id,
        };
        let outcome = self.parser.parse(&raw, &ctx);
        let mut result = outcome.result;

        if outcome.allows_backfill && result.len() < limit {
            let chosen = std::mem::take(&mut result.recommendations);
            let mut items = backfill(chosen, &candidates, limit, query);
            if items.len() < limit {
                items = backfill(items, &pool, limit, query);
            }
            result.recommendations = items;
        }

        info!(
            "Fast path returned {} items ({:?}) in {:.2?}",
            result.len(),
            result.confidence,
            start.elapsed()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Confidence;
    use async_trait::async_trait;
    use catalog::{CatalogIndex, CatalogStore, FlavorProfile};
    use llm_client::{ConversationRequest, ToolExecutor, Transcript};
    use sources::CandidateSampler;
    use std::sync::Mutex;

    // =========================================================================
    // Fixtures
    // =========================================================================

    type Reply = Box<dyn Fn(&CompletionRequest) -> llm_client::Result<String> + Send + Sync>;

    /// Answers through a closure and remembers the requests it saw
    struct ScriptedLlm {
        reply: Reply,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        fn new(reply: impl Fn(&CompletionRequest) -> llm_client::Result<String> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                reply: Box::new(reply),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn replying(text: &'static str) -> Arc<Self> {
            Self::new(move |_| Ok(text.to_string()))
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, request: &CompletionRequest) -> llm_client::Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            (self.reply)(request)
        }

        async fn converse(
            &self,
            _request: &ConversationRequest,
            _tools: &dyn ToolExecutor,
        ) -> llm_client::Result<Transcript> {
            Err(LlmError::InvalidResponse("not scripted".to_string()))
        }
    }

    /// Never answers
    struct StalledLlm;

    #[async_trait]
    impl LlmClient for StalledLlm {
        async fn complete(&self, _request: &CompletionRequest) -> llm_client::Result<String> {
            std::future::pending().await
        }

        async fn converse(
            &self,
            _request: &ConversationRequest,
            _tools: &dyn ToolExecutor,
        ) -> llm_client::Result<Transcript> {
            std::future::pending().await
        }
    }

    /// Ids listed in a fast-path prompt, in order
    fn prompt_ids(prompt: &str) -> Vec<String> {
        prompt
            .split("\"id\": \"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect()
    }

    fn catalog(n: usize) -> Arc<dyn CatalogStore> {
        let items = (0..n)
            .map(|i| {
                CatalogItem::new(format!("W{}", i), format!("Whisky {}", i), 30_000.0 + i as f64 * 10_000.0)
                    .with_origin(if i % 2 == 0 { "Scotland" } else { "Japan" })
                    .with_flavor(FlavorProfile::new(2.0, 3.0, (i % 6) as f32, 3.0))
            })
            .collect();
        Arc::new(CatalogIndex::from_items(items).unwrap())
    }

    fn selector(n: usize, llm: Arc<ScriptedLlm>) -> FastPathSelector {
        let pool = SamplePool::new(catalog(n), CandidateSampler::new().with_target(n));
        FastPathSelector::new(Arc::new(pool), llm)
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[test]
    fn test_max_tokens() {
        assert_eq!(max_tokens(1), 1000);
        assert_eq!(max_tokens(5), 1250);
        assert_eq!(max_tokens(20), 3500);
    }

    #[test]
    fn test_narrow_widens_when_filters_leave_too_few() {
        let selector = selector(40, ScriptedLlm::replying("{}"));
        let pool: Vec<CatalogItem> = (0..40)
            .map(|i| CatalogItem::new(format!("W{}", i), "x", 50_000.0).with_origin("Scotland"))
            .collect();

        // Nothing is Japanese, so the origin filter empties the set
        let narrowed = selector.narrow_candidates("일본 위스키", &pool, 5);
        assert_eq!(narrowed.len(), 15);
        assert_eq!(narrowed[0].id, "W0");

        let narrowed = selector.narrow_candidates("일본 위스키", &pool, 12);
        assert_eq!(narrowed.len(), 18);
    }

    #[test]
    fn test_narrow_keeps_filtered_set_when_large_enough() {
        let selector = selector(40, ScriptedLlm::replying("{}"));
        let pool: Vec<CatalogItem> = (0..40)
            .map(|i| {
                let origin = if i < 25 { "Scotland" } else { "Japan" };
                CatalogItem::new(format!("W{}", i), "x", 50_000.0).with_origin(origin)
            })
            .collect();

        let narrowed = selector.narrow_candidates("일본 위스키", &pool, 4);
        assert_eq!(narrowed.len(), 15);
        assert!(narrowed.iter().all(|item| item.origin == "Japan"));
    }

    #[tokio::test]
    async fn test_short_strict_selection_is_backfilled() {
        // Picks the first three candidates it was shown
        let llm = ScriptedLlm::new(|request| {
            let ids = prompt_ids(&request.prompt);
            Ok(serde_json::json!({ "analysis": "a", "ids": &ids[..3], "summary": "s" }).to_string())
        });
        let selector = selector(30, llm.clone());

        let result = selector.select("부드러운 위스키 추천해줘", 10).await.unwrap();
        assert!(result.success);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.len(), 10);
        assert_eq!(result.recommendations.iter().filter(|i| i.is_backfill()).count(), 7);
        assert!(result.recommendations[..3].iter().all(|i| !i.is_backfill()));

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, Some(2000));
        assert!(requests[0].json_mode);
        assert_eq!(prompt_ids(&requests[0].prompt).len(), 15);
    }

    #[tokio::test]
    async fn test_unstructured_reply_degrades() {
        let selector = selector(30, ScriptedLlm::replying("I like whisky."));
        let result = selector.select("부드러운 위스키 추천해줘", 10).await.unwrap();
        assert!(result.success);
        assert_eq!(result.confidence, Confidence::Degraded);
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_backfilled_to_limit() {
        let llm = ScriptedLlm::replying(r#"{"ids": ["X1", "X2"]}"#);
        let result = selector(30, llm).select("부드러운 위스키 추천해줘", 5).await.unwrap();

        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.len(), 5);
        assert!(result.recommendations.iter().all(|i| i.is_backfill()));
        assert!(result.recommendations.iter().all(|i| i.id.starts_with('W')));
    }

    #[tokio::test]
    async fn test_name_extraction_is_backfilled_to_limit() {
        // Names one candidate in prose instead of JSON
        let llm = ScriptedLlm::new(|request| {
            let ids = prompt_ids(&request.prompt);
            Ok(format!("I would pick Whisky {} for you.", &ids[0][1..]))
        });
        let selector = selector(30, llm.clone());

        let result = selector.select("부드러운 위스키 추천해줘", 10).await.unwrap();
        assert_eq!(result.confidence, Confidence::Degraded);
        assert_eq!(result.len(), 10);

        let first = prompt_ids(&llm.requests.lock().unwrap()[0].prompt)[0].clone();
        assert_eq!(result.recommendations[0].id, first);
        assert!(!result.recommendations[0].is_backfill());
        assert_eq!(result.recommendations.iter().filter(|i| i.is_backfill()).count(), 9);
    }

    #[tokio::test]
    async fn test_context_reaches_prompt_but_not_filters() {
        let llm = ScriptedLlm::replying("{}");
        let selector = selector(30, llm.clone());
        let context = "[User taste profile]\nSweetness: very dry\nPreferred origin: Japan";

        let pool = selector.pool().get().await.unwrap();
        let expected: Vec<String> = selector
            .narrow_candidates("위스키 추천해줘", &pool, 5)
            .into_iter()
            .map(|item| item.id)
            .collect();

        selector
            .select_with_context("위스키 추천해줘", Some(context), 5)
            .await
            .unwrap();
        let prompt = llm.requests.lock().unwrap()[0].prompt.clone();
        assert!(prompt.ends_with(context));
        assert_eq!(prompt_ids(&prompt), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_model_times_out() {
        let pool = SamplePool::new(catalog(30), CandidateSampler::new().with_target(30));
        let selector = FastPathSelector::new(Arc::new(pool), Arc::new(StalledLlm))
            .with_request_timeout(Duration::from_secs(5));

        let err = selector.select("위스키", 3).await.unwrap_err();
        assert!(matches!(err, EngineError::LlmTransport(LlmError::Timeout(t)) if t == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let llm = ScriptedLlm::new(|_| Err(LlmError::Connection("refused".to_string())));
        let err = selector(30, llm).select("위스키", 3).await.unwrap_err();
        assert!(matches!(err, EngineError::LlmTransport(_)));
    }
}
