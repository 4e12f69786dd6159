//! Catalog lookups offered to the model during an agentic conversation.

use async_trait::async_trait;
use catalog::{CatalogError, CatalogItem, CatalogStore, ItemId, DEFAULT_TOLERANCE};
use llm_client::{LlmError, ToolCall, ToolExecutor, ToolSpec, Transcript};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub const PRICE_RANGE_TOOL: &str = "get_items_by_price_range";
pub const FLAVOR_PROFILE_TOOL: &str = "get_items_by_flavor_profile";
pub const ORIGIN_TOOL: &str = "get_items_by_origin";

const PRICE_RANGE_CAP: usize = 30;
const FLAVOR_PROFILE_CAP: usize = 30;
const ORIGIN_CAP: usize = 50;

/// What a tool returns per item
#[derive(Debug, Serialize)]
struct ToolItemView<'a> {
    id: &'a str,
    name: &'a str,
    price: f64,
    age: Option<u32>,
    origin: &'a str,
    #[serde(rename = "type")]
    item_type: &'a str,
    body: f32,
    richness: f32,
    smoke: f32,
    sweetness: f32,
}

impl<'a> From<&'a CatalogItem> for ToolItemView<'a> {
    fn from(item: &'a CatalogItem) -> Self {
        Self {
            id: &item.id,
            name: &item.name,
            price: item.price,
            age: item.age,
            origin: &item.origin,
            item_type: &item.item_type,
            body: item.flavor.body,
            richness: item.flavor.richness,
            smoke: item.flavor.smoke,
            sweetness: item.flavor.sweetness,
        }
    }
}

/// The three catalog lookup tools over a `CatalogStore`
#[derive(Clone)]
pub struct CatalogTools {
    store: Arc<dyn CatalogStore>,
}

impl CatalogTools {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    fn slim(items: &[CatalogItem], cap: usize) -> Value {
        let view: Vec<ToolItemView<'_>> = items.iter().take(cap).map(ToolItemView::from).collect();
        json!(view)
    }
}

fn tool_error(tool: &str, reason: impl Into<String>) -> LlmError {
    LlmError::Tool {
        tool: tool.to_string(),
        reason: reason.into(),
    }
}

fn catalog_error(tool: &str, err: CatalogError) -> LlmError {
    tool_error(tool, err.to_string())
}

fn number_arg(call: &ToolCall, key: &str) -> Result<f64, LlmError> {
    match call.arguments.get(key) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| tool_error(&call.name, format!("{} is not a number", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| tool_error(&call.name, format!("{} is not a number", key))),
        _ => Err(tool_error(&call.name, format!("missing argument {}", key))),
    }
}

#[async_trait]
impl ToolExecutor for CatalogTools {
    fn manifest(&self) -> Vec<ToolSpec> {
        let score = |what: &str| json!({ "type": "number", "description": format!("{} score, 0-5", what) });

        vec![
            ToolSpec {
                name: PRICE_RANGE_TOOL.to_string(),
                description: "Find whiskies priced between min_price and max_price (KRW)".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "min_price": { "type": "number" },
                        "max_price": { "type": "number" }
                    },
                    "required": ["min_price", "max_price"]
                }),
            },
            ToolSpec {
                name: FLAVOR_PROFILE_TOOL.to_string(),
                description: "Find whiskies whose flavor scores are all within tolerance of the target".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "body": score("Body"),
                        "richness": score("Richness"),
                        "smoke": score("Smoke"),
                        "sweetness": score("Sweetness"),
                        "tolerance": { "type": "number", "default": DEFAULT_TOLERANCE }
                    },
                    "required": ["body", "richness", "smoke", "sweetness"]
                }),
            },
            ToolSpec {
                name: ORIGIN_TOOL.to_string(),
                description: "Find whiskies whose origin contains the given text".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "origin": { "type": "string" } },
                    "required": ["origin"]
                }),
            },
        ]
    }

    async fn execute(&self, call: &ToolCall) -> llm_client::Result<Value> {
        let name = call.name.as_str();
        let output = match name {
            PRICE_RANGE_TOOL => {
                let min = number_arg(call, "min_price")?;
                let max = number_arg(call, "max_price")?;
                let items = self
                    .store
                    .items_by_price_range(min, max)
                    .await
                    .map_err(|e| catalog_error(name, e))?;
                Self::slim(&items, PRICE_RANGE_CAP)
            }
            FLAVOR_PROFILE_TOOL => {
                let tolerance = number_arg(call, "tolerance").unwrap_or(DEFAULT_TOLERANCE as f64);
                let items = self
                    .store
                    .items_by_flavor_profile(
                        number_arg(call, "body")? as f32,
                        number_arg(call, "richness")? as f32,
                        number_arg(call, "smoke")? as f32,
                        number_arg(call, "sweetness")? as f32,
                        tolerance as f32,
                    )
                    .await
                    .map_err(|e| catalog_error(name, e))?;
                Self::slim(&items, FLAVOR_PROFILE_CAP)
            }
            ORIGIN_TOOL => {
                let origin = call
                    .arguments
                    .get("origin")
                    .and_then(Value::as_str)
                    .ok_or_else(|| tool_error(name, "missing argument origin"))?;
                let items = self
                    .store
                    .items_by_origin(origin)
                    .await
                    .map_err(|e| catalog_error(name, e))?;
                Self::slim(&items, ORIGIN_CAP)
            }
            other => return Err(tool_error(other, "unknown tool")),
        };

        debug!(
            "Tool {} returned {} items",
            name,
            output.as_array().map(Vec::len).unwrap_or(0)
        );
        Ok(output)
    }
}

/// Distinct ids surfaced by tool executions, in order of first appearance
pub fn surfaced_ids(transcript: &Transcript) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    transcript
        .tool_outputs()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|item| item.get("id").and_then(Value::as_str))
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogIndex, FlavorProfile};
    use llm_client::TranscriptEvent;

    fn tools() -> CatalogTools {
        let items = vec![
            CatalogItem::new("W1", "Tamdhu 12", 94_100.0)
                .with_origin("Scotland")
                .with_flavor(FlavorProfile::new(2.0, 3.0, 0.0, 3.0)),
            CatalogItem::new("W7", "Laphroaig 10", 77_400.0)
                .with_origin("Scotland")
                .with_flavor(FlavorProfile::new(3.0, 5.0, 5.0, 2.0)),
            CatalogItem::new("W20", "Hibiki Harmony", 160_000.0)
                .with_origin("Japan")
                .with_flavor(FlavorProfile::new(2.0, 3.0, 1.0, 3.0)),
        ];
        CatalogTools::new(Arc::new(CatalogIndex::from_items(items).unwrap()))
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_manifest_has_three_tools() {
        let names: Vec<String> = tools().manifest().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec![PRICE_RANGE_TOOL, FLAVOR_PROFILE_TOOL, ORIGIN_TOOL]);
    }

    #[tokio::test]
    async fn test_price_range_tool() {
        let output = tools()
            .execute(&call(PRICE_RANGE_TOOL, json!({ "min_price": 0, "max_price": "100000" })))
            .await
            .unwrap();
        let mut ids: Vec<&str> = output
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["W1", "W7"]);
    }

    #[tokio::test]
    async fn test_flavor_tool_defaults_tolerance() {
        let output = tools()
            .execute(&call(
                FLAVOR_PROFILE_TOOL,
                json!({ "body": 3, "richness": 5, "smoke": 5, "sweetness": 2 }),
            ))
            .await
            .unwrap();
        let items = output.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "W7");
        assert_eq!(items[0]["type"], "unknown");
    }

    #[tokio::test]
    async fn test_bad_arguments_are_tool_errors() {
        let tools = tools();

        let err = tools
            .execute(&call(PRICE_RANGE_TOOL, json!({ "min_price": 0 })))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Tool { ref tool, .. } if tool == PRICE_RANGE_TOOL));

        let err = tools.execute(&call("drop_table", json!({}))).await.unwrap_err();
        assert!(matches!(err, LlmError::Tool { .. }));
    }

    #[test]
    fn test_surfaced_ids_dedupes() {
        let mut transcript = Transcript::default();
        for output in [json!([{ "id": "W7" }, { "id": "W1" }]), json!([{ "id": "W1" }, { "id": "W20" }])] {
            transcript.push(TranscriptEvent::Execute {
                tool: ORIGIN_TOOL.to_string(),
                arguments: json!({}),
                output,
            });
        }
        assert_eq!(surfaced_ids(&transcript), vec!["W7", "W1", "W20"]);
    }
}
