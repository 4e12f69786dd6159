//! Request and result types of the recommendation engine.

use catalog::{CatalogItem, FlavorProfile, ItemId};
use serde::Serialize;

/// Reason attached to items added by backfill rather than chosen by the model
pub const BACKFILL_REASON: &str = "Added from remaining candidates to complete the list";

/// Reason used when the model chose an item without explaining why
pub const DEFAULT_REASON: &str = "Selected";

pub const DEFAULT_ANALYSIS: &str = "Analysis complete";
pub const DEFAULT_SUMMARY: &str = "Recommendation complete";

/// Incoming request, before validation
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub text: String,
    pub limit: usize,
    /// Rendered taste-profile context; shown to the model, never classified
    pub preference_context: Option<String>,
}

impl RecommendationRequest {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
            preference_context: None,
        }
    }

    pub fn with_preference_context(mut self, context: impl Into<String>) -> Self {
        self.preference_context = Some(context.into());
        self
    }

    /// The user's own words, which drive classification and filtering
    pub fn query(&self) -> &str {
        self.text.trim()
    }

    /// Non-blank preference context
    pub fn context(&self) -> Option<&str> {
        self.preference_context
            .as_deref()
            .map(str::trim)
            .filter(|context| !context.is_empty())
    }
}

/// How much the caller can trust a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Every item was chosen from the catalog by the model, or backfilled from it
    High,
    /// The model's output was unusable and a fallback extraction produced the list
    Degraded,
}

/// Which route produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    Fast,
    Agentic,
    AgenticCached,
    FastFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub age: Option<u32>,
    pub origin: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub image: Option<String>,
    pub scores: FlavorProfile,
    pub reason: String,
}

impl RecommendationItem {
    pub fn from_catalog(item: &CatalogItem, reason: impl Into<String>) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            age: item.age,
            origin: item.origin.clone(),
            item_type: item.item_type.clone(),
            image: item.image.clone(),
            scores: item.flavor,
            reason: reason.into(),
        }
    }

    pub fn is_backfill(&self) -> bool {
        self.reason == BACKFILL_REASON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub success: bool,
    pub analysis: String,
    pub recommendations: Vec<RecommendationItem>,
    pub summary: String,
    pub message: String,
    pub confidence: Confidence,
    pub path: Option<ResolutionPath>,
}

impl RecommendationResult {
    /// A successful result; `message` joins analysis and summary
    pub fn success(
        analysis: impl Into<String>,
        recommendations: Vec<RecommendationItem>,
        summary: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        let analysis = analysis.into();
        let summary = summary.into();
        Self {
            success: true,
            message: format!("{} {}", analysis, summary),
            analysis,
            recommendations,
            summary,
            confidence,
            path: None,
        }
    }

    /// A hard failure, surfaced to the caller with `message`
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis: String::new(),
            recommendations: Vec::new(),
            summary: String::new(),
            message: message.into(),
            confidence: Confidence::Degraded,
            path: None,
        }
    }

    pub fn with_path(mut self, path: ResolutionPath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_context_stay_apart() {
        let request = RecommendationRequest::new("  부드러운 위스키  ", 5)
            .with_preference_context("[User taste profile]\nBody: light");
        assert_eq!(request.query(), "부드러운 위스키");
        assert_eq!(request.context(), Some("[User taste profile]\nBody: light"));

        let bare = RecommendationRequest::new("위스키", 5).with_preference_context("  ");
        assert_eq!(bare.context(), None);
    }

    #[test]
    fn test_success_message_joins_parts() {
        let result = RecommendationResult::success("A", Vec::new(), "B", Confidence::High);
        assert!(result.success);
        assert_eq!(result.message, "A B");
        assert!(result.path.is_none());
    }

    #[test]
    fn test_result_serializes_snake_case() {
        let result = RecommendationResult::failure("catalog down").with_path(ResolutionPath::FastFallback);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["confidence"], "degraded");
        assert_eq!(value["path"], "fast_fallback");
    }
}
