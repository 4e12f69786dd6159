//! Response Parser/Validator
//!
//! Turns raw model output into a `RecommendationResult` through an ordered
//! chain of strategies. The chain never fails: when nothing structured can
//! be recovered the static defaults are returned, flagged `Degraded`.
//! A schema-valid selection is accepted even if none of its ids are known.

pub mod reasons;
pub mod schema;
pub mod strategies;

pub use reasons::profile_reason;
pub use schema::{extract_json_object, parse_selection, ParseFailure, ParsedSelection};
pub use strategies::{
    default_items, JsonSelection, KnownName, ParseContext, StaticDefaults, Strategy, TableRow,
};

use crate::types::RecommendationResult;
use tracing::{info, warn};

/// A parsed reply, and whether it may be padded to the requested count
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub result: RecommendationResult,
    pub strategy: &'static str,
    pub allows_backfill: bool,
}

pub struct ResponseParser {
    strategies: Vec<Box<dyn Strategy>>,
}

impl ResponseParser {
    /// JSON, table rows, known names, static defaults
    pub fn standard() -> Self {
        Self::new()
            .add_strategy(JsonSelection)
            .add_strategy(TableRow)
            .add_strategy(KnownName)
            .add_strategy(StaticDefaults)
    }

    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn add_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn parse(&self, raw: &str, ctx: &ParseContext<'_>) -> ParseOutcome {
        for (position, strategy) in self.strategies.iter().enumerate() {
            match strategy.extract(raw, ctx) {
                Some(result) => {
                    if position > 0 {
                        warn!(
                            "Model output recovered by fallback strategy {} ({} items)",
                            strategy.name(),
                            result.recommendations.len()
                        );
                    } else {
                        info!("Parsed {} items with {}", result.recommendations.len(), strategy.name());
                    }
                    return ParseOutcome {
                        result,
                        strategy: strategy.name(),
                        allows_backfill: strategy.allows_backfill(),
                    };
                }
                None => continue,
            }
        }

        warn!("No strategy recovered the model output, using static defaults");
        ParseOutcome {
            result: StaticDefaults::result(ctx.limit),
            strategy: StaticDefaults.name(),
            allows_backfill: false,
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::standard()
    }
}
