//! Strict schema for the model's selection output.
//!
//! The model is asked for exactly one JSON object:
//! `{ "analysis": str, "ids": [str], "reasons": { id: str }, "summary": str }`.
//! Validation yields either a `ParsedSelection` or a `ParseFailure` naming
//! what was wrong; nothing here returns `Err` past the parser.

use crate::types::{
    Confidence, RecommendationItem, RecommendationResult, DEFAULT_ANALYSIS, DEFAULT_REASON,
    DEFAULT_SUMMARY,
};
use catalog::{CatalogItem, ItemId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no JSON object in output")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing \"ids\" array")]
    MissingIds,

    #[error("\"ids\" array is empty")]
    EmptyIds,
}

/// A schema-valid selection, ids not yet resolved to catalog items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSelection {
    pub analysis: Option<String>,
    /// Distinct ids in the order the model gave them
    pub ids: Vec<ItemId>,
    pub reasons: HashMap<ItemId, String>,
    pub summary: Option<String>,
}

impl ParsedSelection {
    pub fn reason_for(&self, id: &str) -> Option<&str> {
        self.reasons.get(id).map(String::as_str)
    }

    /// Resolve ids through `lookup`, dropping unknown ones, keeping at most `limit`
    pub fn resolve<'a, F>(&self, lookup: F, limit: usize) -> Vec<RecommendationItem>
    where
        F: Fn(&str) -> Option<&'a CatalogItem>,
    {
        self.ids
            .iter()
            .filter_map(|id| lookup(id.as_str()))
            .take(limit)
            .map(|item| {
                let reason = self.reason_for(&item.id).unwrap_or(DEFAULT_REASON);
                RecommendationItem::from_catalog(item, reason)
            })
            .collect()
    }

    pub fn into_result(self, items: Vec<RecommendationItem>, confidence: Confidence) -> RecommendationResult {
        RecommendationResult::success(
            self.analysis.unwrap_or_else(|| DEFAULT_ANALYSIS.to_string()),
            items,
            self.summary.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            confidence,
        )
    }
}

/// The span from the first `{` to the last `}`, tolerating prose or code
/// fences around the object
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

pub fn parse_selection(raw: &str) -> Result<ParsedSelection, ParseFailure> {
    let object = extract_json_object(raw).ok_or(ParseFailure::NoJsonObject)?;
    let value: Value =
        serde_json::from_str(object).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ParseFailure::InvalidJson("top level is not an object".to_string()));
    };

    let raw_ids = fields
        .get("ids")
        .and_then(Value::as_array)
        .ok_or(ParseFailure::MissingIds)?;

    let mut seen = HashSet::new();
    let ids: Vec<ItemId> = raw_ids
        .iter()
        .filter_map(|id| match id {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect();

    if ids.is_empty() {
        return Err(ParseFailure::EmptyIds);
    }

    let reasons = fields
        .get("reasons")
        .and_then(Value::as_object)
        .map(|reasons| {
            reasons
                .iter()
                .filter_map(|(id, reason)| {
                    let id = id.trim();
                    let reason = reason.as_str()?.trim();
                    (!id.is_empty() && !reason.is_empty()).then(|| (id.to_string(), reason.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    let text_field = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(ParsedSelection {
        analysis: text_field("analysis"),
        ids,
        reasons,
        summary: text_field("summary"),
    })
}
