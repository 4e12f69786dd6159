use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use catalog::{CatalogIndex, CatalogItem, CatalogStore};
use llm_client::OpenAiClient;
use rand::seq::IndexedRandom;
use server::{Confidence, EngineConfig, RecommendationOrchestrator, RecommendationResult};
use sources::PRICE_BANDS;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// cask-recs - whisky recommendation engine
#[derive(Parser)]
#[command(name = "cask-recs")]
#[command(about = "Whisky recommendations from natural-language requests", long_about = None)]
struct Cli {
    /// Path to the catalog JSON file
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    /// Optional engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend whiskies for a request
    Recommend {
        /// Request text, e.g. "부드러운 위스키 추천해줘"
        #[arg(long)]
        query: String,

        /// Number of recommendations to return (clamped to 1-20)
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Show the route taken and a reason for each item
        #[arg(long)]
        explain: bool,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a request without calling the LLM
    Classify {
        #[arg(long)]
        query: String,
    },

    /// Draw the fast-path working set and show its price-band spread
    Sample,

    /// Search items by name and/or type
    Search {
        /// Case-insensitive substring of the item name
        #[arg(long)]
        name: Option<String>,

        /// Case-insensitive substring of the item type, e.g. "single_malt"
        #[arg(long = "type")]
        item_type: Option<String>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "20")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "4")]
        concurrent: usize,
    },
}

const BENCHMARK_QUERIES: &[&str] = &[
    "부드러운 위스키 추천해줘",
    "스모키한 위스키",
    "달콤한 위스키 추천",
    "10만원 이하이면서 스모키하고 바디감이 강한 스코틀랜드 위스키를 추천해줘",
    "smooth whisky for a beginner",
];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Classification needs neither the catalog nor the LLM
    if let Commands::Classify { query } = &cli.command {
        handle_classify(query);
        return Ok(());
    }

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_file(&cli.catalog).context("Failed to load catalog")?,
    );
    println!("{} Loaded {} items in {:?}", "✓".green(), index.len(), start.elapsed());

    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path).context("Failed to load engine configuration")?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    match cli.command {
        Commands::Recommend {
            query,
            limit,
            explain,
            json,
        } => {
            let orchestrator = build_orchestrator(index, &config)?;
            handle_recommend(&orchestrator, &query, limit, explain, json).await?
        }
        Commands::Classify { .. } => {}
        Commands::Sample => {
            let orchestrator = build_orchestrator(index, &config)?;
            handle_sample(&orchestrator).await?
        }
        Commands::Search { name, item_type } => {
            handle_search(&index, name.as_deref(), item_type.as_deref()).await?
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            let orchestrator = build_orchestrator(index, &config)?;
            handle_benchmark(orchestrator, requests, concurrent).await?
        }
    }

    Ok(())
}

fn build_orchestrator(index: Arc<CatalogIndex>, config: &EngineConfig) -> Result<RecommendationOrchestrator> {
    let llm = OpenAiClient::new(config.llm.to_settings()).context("Failed to build LLM client")?;
    let store: Arc<dyn CatalogStore> = index;
    Ok(RecommendationOrchestrator::new(store, Arc::new(llm), config))
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    query: &str,
    limit: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let result = orchestrator.get_recommendation(query, limit).await;
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.success {
        println!("{} {}", "✗".red(), result.message);
        return Ok(());
    }

    print_recommendations(&result, explain);
    if explain {
        println!();
        println!("Route: {:?}, confidence: {:?}, {:?}", result.path, result.confidence, elapsed);
    }
    Ok(())
}

/// Handle the 'classify' command
fn handle_classify(query: &str) {
    let signal = pipeline::classify(query);
    let verdict = if signal.is_complex {
        "complex (agentic path)".yellow()
    } else {
        "simple (fast path)".green()
    };
    println!("{} {}", "Classification:".bold().blue(), verdict);

    let tags: Vec<&str> = signal.flavor_tags.iter().map(|tag| tag.label()).collect();
    println!("{}Flavor tags: {}", "• ".green(), if tags.is_empty() { "-".to_string() } else { tags.join(", ") });

    let i = &signal.indicators;
    let flags = [
        ("multiple flavors", i.multiple_flavors),
        ("conjunctions", i.conjunctions),
        ("specific numbers", i.specific_numbers),
        ("comparisons", i.comparisons),
        ("range", i.range_conditions),
        ("multiple conditions", i.multiple_conditions),
        ("flavor combination", i.flavor_combination),
    ];
    for (name, on) in flags {
        println!("{}{}: {}", "• ".cyan(), name, if on { "yes".green() } else { "no".normal() });
    }
}

/// Handle the 'sample' command
async fn handle_sample(orchestrator: &RecommendationOrchestrator) -> Result<()> {
    let start = Instant::now();
    let pool = orchestrator.pool().get().await.context("Failed to draw the working set")?;
    println!(
        "{} Working set of {} items drawn in {:?}",
        "✓".green(),
        pool.len(),
        start.elapsed()
    );

    for band in &PRICE_BANDS {
        let count = pool.iter().filter(|item| band.contains(item.price)).count();
        println!("  {:<12} {}", band.label, count);
    }
    Ok(())
}

/// Items matching every filter given; exact name matches first, then by price
async fn find_items(
    index: &CatalogIndex,
    name: Option<&str>,
    item_type: Option<&str>,
) -> catalog::Result<Vec<CatalogItem>> {
    let mut matches: Vec<CatalogItem> = match item_type {
        Some(item_type) => index.items_by_type(item_type).await?,
        None => index.search_by_name(name.unwrap_or_default()).into_iter().cloned().collect(),
    };

    let needle = name.map(|n| n.trim().to_lowercase()).unwrap_or_default();
    matches.retain(|item| item.name.to_lowercase().contains(&needle));
    matches.sort_by(|a, b| {
        let a_inexact = a.name.to_lowercase() != needle;
        let b_inexact = b.name.to_lowercase() != needle;
        a_inexact
            .cmp(&b_inexact)
            .then_with(|| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal))
    });
    Ok(matches)
}

/// Handle the 'search' command
async fn handle_search(index: &CatalogIndex, name: Option<&str>, item_type: Option<&str>) -> Result<()> {
    if name.is_none() && item_type.is_none() {
        anyhow::bail!("search needs --name, --type or both");
    }
    let matches = find_items(index, name, item_type).await?;

    let label = [name, item_type].into_iter().flatten().collect::<Vec<_>>().join(" / ");
    println!("{}", format!("Search results for '{}':", label).bold().blue());
    if matches.is_empty() {
        println!("  no matches");
    }
    for item in matches.iter().take(20) {
        println!(
            "{}: {} [{} / {}] {:.0} KRW",
            item.id, item.name, item.origin, item.item_type, item.price
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let queries: Vec<&'static str> = {
        let mut rng = rand::rng();
        (0..requests)
            .filter_map(|_| BENCHMARK_QUERIES.choose(&mut rng).copied())
            .collect()
    };

    let limiter = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();

    let mut handles = vec![];
    for query in queries {
        let orchestrator = orchestrator.clone();
        let limiter = Arc::clone(&limiter);
        handles.push(tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let start = Instant::now();
            let result = orchestrator.get_recommendation(query, 5).await;
            Ok::<_, anyhow::Error>((start.elapsed(), result.success))
        }));
    }

    let mut timings: Vec<Duration> = vec![];
    let mut failures = 0;
    for handle in handles {
        let (elapsed, success) = handle.await??;
        timings.push(elapsed);
        if !success {
            failures += 1;
        }
    }
    let total_time = wall.elapsed();

    if timings.is_empty() {
        println!("No requests were made");
        return Ok(());
    }

    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} failed, {} concurrent)", timings.len(), failures, concurrent);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f32 / total_time.as_secs_f32()
    );

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(result: &RecommendationResult, explain: bool) {
    println!("{}", "Whisky Recommendations:".bold().blue());
    if result.confidence == Confidence::Degraded {
        println!("{}", "(best-effort result: the model's reply could not be fully parsed)".yellow());
    }
    println!("{}", result.analysis);

    for (rank, item) in result.recommendations.iter().enumerate() {
        let age = item.age.map(|a| format!("{}y", a)).unwrap_or_else(|| "NAS".to_string());
        println!(
            "{}. {} ({}, {}) - {:.0} KRW",
            (rank + 1).to_string().green(),
            item.name,
            item.origin,
            age,
            item.price
        );
        if explain {
            println!(
                "   body {:.0} / richness {:.0} / smoke {:.0} / sweetness {:.0}",
                item.scores.body, item.scores.richness, item.scores.smoke, item.scores.sweetness
            );
            println!("   {}", item.reason);
        }
    }
    println!("{}", result.summary);
}
