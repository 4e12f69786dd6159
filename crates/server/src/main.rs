//! Simple test harness for the recommendation orchestrator.
//!
//! Loads a catalog, connects to the configured LLM service and runs a
//! handful of sample requests through both paths.
//!
//! ```text
//! cargo run -p server -- [catalog.json] [engine.toml]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::CatalogIndex;
use llm_client::OpenAiClient;
use server::{EngineConfig, RecommendationOrchestrator};

const SAMPLE_REQUESTS: &[(&str, usize)] = &[
    ("부드러운 위스키 추천해줘", 5),
    ("10만원 이하이면서 스모키하고 바디감이 강한 스코틀랜드 위스키를 추천해줘", 5),
    ("sweet and fruity Japanese whisky", 3),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting cask-recs engine test harness");

    let mut args = std::env::args().skip(1);
    let catalog_path = PathBuf::from(args.next().unwrap_or_else(|| "data/catalog.json".to_string()));
    let config = match args.next() {
        Some(path) => EngineConfig::from_toml_file(&PathBuf::from(path))?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    let index = CatalogIndex::load_from_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", catalog_path.display()))?;
    info!("Catalog loaded: {} items", index.len());

    let llm = OpenAiClient::new(config.llm.to_settings()).context("Failed to build LLM client")?;
    let orchestrator = RecommendationOrchestrator::new(Arc::new(index), Arc::new(llm), &config);

    for &(text, limit) in SAMPLE_REQUESTS {
        info!("Request: {:?} (limit: {})", text, limit);
        let result = orchestrator.get_recommendation(text, limit).await;

        info!(
            "success={} path={:?} confidence={:?}: {}",
            result.success, result.path, result.confidence, result.message
        );
        for (i, item) in result.recommendations.iter().enumerate() {
            info!("{}. [{}] {} - {:.0} KRW", i + 1, item.id, item.name, item.price);
            info!("   {}", item.reason);
        }
    }

    Ok(())
}
