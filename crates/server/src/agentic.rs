//! Agentic-Path Orchestrator
//!
//! A tool-calling conversation in which the model queries the catalog itself.
//!
//! ## Algorithm
//! 1. Return the cached result for (limit, normalized text and context) if present
//! 2. Converse with the model, offering the three catalog tools, under a
//!    tool-call budget and an overall timeout
//! 3. Validate the final JSON strictly and resolve ids against the catalog
//!    read interface (not the slim tool output)
//! 4. Backfill a short selection from items the tools surfaced, then from
//!    the working set
//! 5. Cache the result
//!
//! Every failure is returned as an `Err`; the orchestrator answers it by
//! falling back to the fast path.

use crate::backfill::backfill;
use crate::cache::{cache_key, ResponseCache};
use crate::error::{EngineError, Result};
use crate::prompts::{agentic_system_prompt, agentic_user_prompt};
use crate::response::{parse_selection, profile_reason};
use crate::tools::{surfaced_ids, CatalogTools};
use crate::types::{Confidence, RecommendationResult, ResolutionPath};
use catalog::{CatalogItem, ItemId};
use llm_client::{ConversationRequest, LlmClient, LlmError};
use sources::SamplePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub struct AgenticPath {
    pool: Arc<SamplePool>,
    llm: Arc<dyn LlmClient>,
    tools: CatalogTools,
    cache: ResponseCache,
    max_tool_calls: usize,
    conversation_timeout: Duration,
    resolve_scan_limit: usize,
}

impl AgenticPath {
    pub fn new(pool: Arc<SamplePool>, llm: Arc<dyn LlmClient>, cache: ResponseCache) -> Self {
        let tools = CatalogTools::new(Arc::clone(pool.store()));
        Self {
            pool,
            llm,
            tools,
            cache,
            max_tool_calls: 2,
            conversation_timeout: Duration::from_secs(60),
            resolve_scan_limit: 1000,
        }
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }

    pub fn with_conversation_timeout(mut self, timeout: Duration) -> Self {
        self.conversation_timeout = timeout;
        self
    }

    pub fn with_resolve_scan_limit(mut self, limit: usize) -> Self {
        self.resolve_scan_limit = limit;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub async fn recommend(&self, query: &str, limit: usize) -> Result<RecommendationResult> {
        self.recommend_with_context(query, None, limit).await
    }

    /// `context` is shown to the model and keys the cache; backfill ranks on
    /// `query` alone
    #[instrument(skip(self, context))]
    pub async fn recommend_with_context(
        &self,
        query: &str,
        context: Option<&str>,
        limit: usize,
    ) -> Result<RecommendationResult> {
        let start = Instant::now();

        let key = match context {
            Some(context) => cache_key(&format!("{query}\n{context}"), limit),
            None => cache_key(query, limit),
        };
        if let Some(hit) = self.cache.get(&key).await {
            info!("Agentic cache hit ({} items)", hit.len());
            return Ok(hit.with_path(ResolutionPath::AgenticCached));
        }

        let request = ConversationRequest::new(
            agentic_system_prompt(limit, self.max_tool_calls),
            agentic_user_prompt(query, context, limit),
        )
        .with_max_tool_calls(self.max_tool_calls);

        let transcript = tokio::time::timeout(
            self.conversation_timeout,
            self.llm.converse(&request, &self.tools),
        )
        .await
        .map_err(|_| EngineError::LlmTransport(LlmError::Timeout(self.conversation_timeout)))?
        .map_err(|e| {
            if e.is_transport() {
                EngineError::LlmTransport(e)
            } else {
                EngineError::AgenticFailure(e.to_string())
            }
        })?;
        info!(
            "Agentic conversation finished with {} tool calls in {:.2?}",
            transcript.tool_call_count(),
            start.elapsed()
        );

        let text = transcript
            .final_text()
            .ok_or_else(|| EngineError::MalformedOutput("conversation ended without an answer".to_string()))?;
        let parsed = parse_selection(text).map_err(|f| EngineError::MalformedOutput(f.to_string()))?;

        let surfaced = surfaced_ids(&transcript);
        let mut wanted = parsed.ids.clone();
        wanted.extend(surfaced.iter().cloned());
        let resolved = self.resolve_ids(&wanted).await?;

        let mut items = parsed.resolve(|id| resolved.get(id), limit);
        if items.is_empty() {
            return Err(EngineError::MalformedOutput(format!(
                "none of the {} ids resolved to catalog items",
                parsed.ids.len()
            )));
        }
        if items.len() < parsed.ids.len().min(limit) {
            warn!(
                "Dropped {} unresolvable ids from the agentic selection",
                parsed.ids.len().min(limit) - items.len()
            );
        }

        for item in &mut items {
            if parsed.reason_for(&item.id).is_none() {
                if let Some(full) = resolved.get(&item.id) {
                    item.reason = profile_reason(full);
                }
            }
        }

        if items.len() < limit {
            let mut candidates: Vec<CatalogItem> = surfaced
                .iter()
                .filter_map(|id| resolved.get(id).cloned())
                .collect();
            match self.pool.get().await {
                Ok(pool) => candidates.extend(pool.iter().cloned()),
                Err(e) => warn!("Working set unavailable for agentic backfill: {}", e),
            }
            items = backfill(items, &candidates, limit, query);
        }

        let result = parsed
            .into_result(items, Confidence::High)
            .with_path(ResolutionPath::Agentic);
        self.cache.set(key, result.clone()).await;

        info!("Agentic path returned {} items in {:.2?}", result.len(), start.elapsed());
        Ok(result)
    }

    /// Full catalog detail for `ids`: one limited scan, then point lookups
    /// for whatever the scan did not cover
    async fn resolve_ids(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, CatalogItem>> {
        let store = self.pool.store();

        let mut resolved: HashMap<ItemId, CatalogItem> = store
            .limited_full_scan(self.resolve_scan_limit)
            .await?
            .into_iter()
            .filter(|item| ids.contains(&item.id))
            .map(|item| (item.id.clone(), item))
            .collect();

        for id in ids {
            if resolved.contains_key(id) {
                continue;
            }
            if let Some(item) = store.item_by_id(id).await? {
                resolved.insert(id.clone(), item);
            }
        }

        debug!("Resolved {} of {} ids", resolved.len(), ids.len());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::PRICE_RANGE_TOOL;
    use crate::types::BACKFILL_REASON;
    use async_trait::async_trait;
    use catalog::{CatalogIndex, CatalogStore, FlavorProfile};
    use llm_client::{CompletionRequest, ToolCall, ToolExecutor, Transcript, TranscriptEvent};
    use serde_json::json;
    use sources::CandidateSampler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // =========================================================================
    // Fixtures
    // =========================================================================

    /// Runs a fixed list of tool calls against the real tools, then answers
    struct ScriptedAgent {
        calls: Vec<ToolCall>,
        answer: std::result::Result<String, fn() -> LlmError>,
        conversations: AtomicUsize,
    }

    impl ScriptedAgent {
        fn answering(calls: Vec<ToolCall>, answer: &str) -> Arc<Self> {
            Arc::new(Self {
                calls,
                answer: Ok(answer.to_string()),
                conversations: AtomicUsize::new(0),
            })
        }

        fn failing(err: fn() -> LlmError) -> Arc<Self> {
            Arc::new(Self {
                calls: Vec::new(),
                answer: Err(err),
                conversations: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedAgent {
        async fn complete(&self, _request: &CompletionRequest) -> llm_client::Result<String> {
            Err(LlmError::InvalidResponse("not scripted".to_string()))
        }

        async fn converse(
            &self,
            _request: &ConversationRequest,
            tools: &dyn ToolExecutor,
        ) -> llm_client::Result<Transcript> {
            self.conversations.fetch_add(1, Ordering::SeqCst);
            let text = self.answer.clone().map_err(|make| make())?;

            let mut transcript = Transcript::default();
            for call in &self.calls {
                let output = tools.execute(call).await?;
                transcript.push(TranscriptEvent::Execute {
                    tool: call.name.clone(),
                    arguments: call.arguments.clone(),
                    output,
                });
            }
            transcript.push(TranscriptEvent::Describe { text });
            Ok(transcript)
        }
    }

    fn store() -> Arc<dyn CatalogStore> {
        let items = (0..12)
            .map(|i| {
                CatalogItem::new(format!("W{}", i), format!("Whisky {}", i), 40_000.0 + i as f64 * 10_000.0)
                    .with_origin("Scotland")
                    .with_flavor(FlavorProfile::new(3.0, 3.0, (i % 5) as f32, 2.0))
            })
            .collect();
        Arc::new(CatalogIndex::from_items(items).unwrap())
    }

    /// Never answers
    struct StalledAgent;

    #[async_trait]
    impl LlmClient for StalledAgent {
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

    fn agentic(llm: Arc<ScriptedAgent>) -> AgenticPath {
        let pool = SamplePool::new(store(), CandidateSampler::new().with_target(12));
        AgenticPath::new(Arc::new(pool), llm, ResponseCache::new(10, Duration::from_secs(60)))
    }

    fn price_search(max: f64) -> ToolCall {
        ToolCall {
            name: PRICE_RANGE_TOOL.to_string(),
            arguments: json!({ "min_price": 0, "max_price": max }),
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_resolves_and_caches() {
        let llm = ScriptedAgent::answering(
            vec![price_search(100_000.0)],
            r#"{"analysis": "smoky under 100k", "ids": ["W4", "W3"], "reasons": {"W4": "smokiest"}, "summary": "two picks"}"#,
        );
        let path = agentic(llm.clone());

        let result = path.recommend("10만원 이하 스모키", 2).await.unwrap();
        assert_eq!(result.path, Some(ResolutionPath::Agentic));
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.analysis, "smoky under 100k");
        let ids: Vec<&str> = result.recommendations.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["W4", "W3"]);
        assert_eq!(result.recommendations[0].reason, "smokiest");
        // W3 had no reason from the model
        assert_ne!(result.recommendations[1].reason, crate::types::DEFAULT_REASON);
        assert_eq!(result.recommendations[1].price, 70_000.0);

        let again = path.recommend("  10만원 이하   스모키 ", 2).await.unwrap();
        assert_eq!(again.path, Some(ResolutionPath::AgenticCached));
        assert_eq!(again.recommendations, result.recommendations);
        assert_eq!(llm.conversations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_selection_backfills_from_tool_results() {
        let llm = ScriptedAgent::answering(vec![price_search(60_000.0)], r#"{"ids": ["W0", "Z9"]}"#);
        let path = agentic(llm);

        let result = path.recommend("싼 위스키", 3).await.unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.recommendations[0].id, "W0");

        // W1 and W2 came back from the price search and outrank the rest of the pool
        let backfilled: Vec<&str> = result
            .recommendations
            .iter()
            .filter(|i| i.reason == BACKFILL_REASON)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(backfilled, vec!["W1", "W2"]);
    }

    #[tokio::test]
    async fn test_malformed_answer_is_not_cached() {
        let llm = ScriptedAgent::answering(Vec::new(), "Here are some whiskies I like.");
        let path = agentic(llm.clone());

        let err = path.recommend("스모키", 3).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedOutput(_)));
        assert!(path.cache().is_empty().await);

        let err = path.recommend("스모키", 3).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedOutput(_)));
        assert_eq!(llm.conversations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_fail() {
        let llm = ScriptedAgent::answering(Vec::new(), r#"{"ids": ["X1", "X2"]}"#);
        let err = agentic(llm).recommend("스모키", 2).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_context_keys_the_cache() {
        let llm = ScriptedAgent::answering(Vec::new(), r#"{"ids": ["W4", "W3"]}"#);
        let path = agentic(llm.clone());

        path.recommend("스모키", 2).await.unwrap();
        let with_profile = path
            .recommend_with_context("스모키", Some("[User taste profile]\nSmokiness: none"), 2)
            .await
            .unwrap();
        assert_eq!(with_profile.path, Some(ResolutionPath::Agentic));
        assert_eq!(llm.conversations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_conversation_times_out() {
        let pool = SamplePool::new(store(), CandidateSampler::new().with_target(12));
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let path = AgenticPath::new(Arc::new(pool), Arc::new(StalledAgent), cache)
            .with_conversation_timeout(Duration::from_secs(20));

        let err = path.recommend("스모키", 2).await.unwrap_err();
        assert!(matches!(err, EngineError::LlmTransport(LlmError::Timeout(t)) if t == Duration::from_secs(20)));
        assert!(path.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_failures_are_classified() {
        let err = agentic(ScriptedAgent::failing(|| LlmError::Connection("reset".to_string())))
            .recommend("스모키", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LlmTransport(_)));

        let err = agentic(ScriptedAgent::failing(|| LlmError::ToolBudgetExceeded { limit: 2 }))
            .recommend("스모키", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AgenticFailure(_)));
    }
}
