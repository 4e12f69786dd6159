//! Benchmarks for candidate sampling and request classification
//!
//! Run with: cargo bench --package sources

use catalog::{CatalogItem, FlavorProfile};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand::rngs::StdRng;
use pipeline::classify;
use sources::{diverse_selection, CandidateSampler};

fn synthetic_catalog(n: usize) -> Vec<CatalogItem> {
    let origins = ["Scotland", "Japan", "USA", "Ireland", "Canada", "Taiwan"];
    let types = ["SINGLE_MALT", "BLENDED", "BOURBON", "RYE", "GRAIN"];
    (0..n)
        .map(|i| {
            CatalogItem::new(format!("W{}", i), format!("Whisky {}", i), 15_000.0 + (i * 7_919 % 400_000) as f64)
                .with_origin(origins[i % origins.len()])
                .with_type(types[i % types.len()])
                .with_flavor(FlavorProfile::new((i % 5) as f32, 3.0, (i % 6) as f32, 2.0))
        })
        .collect()
}

fn bench_select(c: &mut Criterion) {
    let items = synthetic_catalog(300);
    let sampler = CandidateSampler::new();

    c.bench_function("sampler_select_300_to_120", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            let selected = sampler.select(black_box(items.clone()), &mut rng);
            black_box(selected)
        })
    });
}

fn bench_diverse_selection(c: &mut Criterion) {
    let items = synthetic_catalog(300);
    let candidates: Vec<usize> = (0..items.len()).collect();

    c.bench_function("diverse_selection_24_of_300", |b| {
        b.iter(|| {
            let chosen = diverse_selection(black_box(&items), black_box(&candidates), 24);
            black_box(chosen)
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    let queries = [
        "부드러운 위스키 추천해줘",
        "10만원 이하이면서 스모키하고 바디감이 강한 스코틀랜드 위스키를 추천해줘",
        "something smooth and sweet from Japan",
    ];

    c.bench_function("classify_mixed_queries", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(classify(black_box(query)));
            }
        })
    });
}

criterion_group!(benches, bench_select, bench_diverse_selection, bench_classify);
criterion_main!(benches);
