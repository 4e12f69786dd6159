//! Prompt text for both resolution paths.

use catalog::{CatalogItem, ItemId};
use serde::Serialize;

/// The slim per-item view shown to the model
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub origin: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub body: f32,
    pub richness: f32,
    pub smoke: f32,
    pub sweetness: f32,
}

impl From<&CatalogItem> for CandidateView {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            origin: item.origin.clone(),
            item_type: item.item_type.clone(),
            body: item.flavor.body,
            richness: item.flavor.richness,
            smoke: item.flavor.smoke,
            sweetness: item.flavor.sweetness,
        }
    }
}

const OUTPUT_SCHEMA: &str = r#"{
  "analysis": "what the request asks for (under 50 characters)",
  "ids": ["ID1", "ID2", "..."],
  "reasons": { "ID1": "why it fits (under 40 characters)", "ID2": "..." },
  "summary": "one-line summary (under 60 characters)"
}"#;

fn context_block(context: Option<&str>) -> String {
    context.map(|c| format!("\n\n{c}")).unwrap_or_default()
}

/// Single-shot selection over a candidate list
pub fn fast_path_prompt(
    query: &str,
    context: Option<&str>,
    candidates: &[CandidateView],
    limit: usize,
) -> String {
    let context = context_block(context);
    let listing = serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a whisky recommendation assistant. From the candidate list below, choose exactly {limit} \
whiskies that best match the user's request.

Rules:
- Recommend exactly {limit} items, no fewer and no more.
- Choose by id; only ids from the candidate list are valid.
- Keep each reason short.
- Reply with a single JSON object and nothing else.

Candidates:
{listing}

Reply format (strict):
{OUTPUT_SCHEMA}

Request: \"{query}\"{context}"
    )
}

/// System prompt of the tool-calling conversation
pub fn agentic_system_prompt(limit: usize, max_tool_calls: usize) -> String {
    format!(
        "You are a whisky recommendation assistant with read access to the catalog through these tools:
- get_items_by_price_range(min_price, max_price)
- get_items_by_flavor_profile(body, richness, smoke, sweetness, tolerance): scores are 0-5, \
a tolerance of 1-2 keeps the search from coming back empty
- get_items_by_origin(origin)

Search strategy:
1. Start with the price range when the request names a price.
2. Gather enough candidates in one call; only if the results are too thin, relax the \
conditions and search once more.
3. Use at most {max_tool_calls} tool calls in total.

Rules:
- Recommend exactly {limit} items, no fewer and no more.
- Return ids and reasons only, as a single JSON object with no other text.

Reply format (strict):
{OUTPUT_SCHEMA}"
    )
}

pub fn agentic_user_prompt(query: &str, context: Option<&str>, limit: usize) -> String {
    let context = context_block(context);
    format!(
        "Request: \"{query}\"{context}\n\nRecommend exactly {limit} whiskies that fit these conditions best."
    )
}
