//! Candidate Sampler - bounded, diverse subset of the catalog
//!
//! The fast path never scans the whole catalog. Instead it works over a
//! small pool drawn once per process, spread evenly across price bands and,
//! inside each band, across types and origins.
//!
//! ## Algorithm
//! 1. Draw a raw random sample of `pool_size` items from the store
//! 2. Partition the sample into five fixed price bands
//! 3. In each band, take up to `target / 5` items by round-robin over
//!    type groups and origin groups
//! 4. Pad with a random draw from unselected items if short of `target`
//! 5. Truncate to `target`

use catalog::{CatalogItem, CatalogStore, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// A half-open price interval `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
    pub label: &'static str,
}

impl PriceBand {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price < self.max
    }
}

pub const PRICE_BANDS: [PriceBand; 5] = [
    PriceBand { min: 0.0, max: 50_000.0, label: "under 50k" },
    PriceBand { min: 50_000.0, max: 80_000.0, label: "50k-80k" },
    PriceBand { min: 80_000.0, max: 120_000.0, label: "80k-120k" },
    PriceBand { min: 120_000.0, max: 200_000.0, label: "120k-200k" },
    PriceBand { min: 200_000.0, max: f64::INFINITY, label: "200k and up" },
];

pub const DEFAULT_POOL_SIZE: usize = 300;
pub const DEFAULT_TARGET: usize = 120;

/// Builds the fast path's working set
#[derive(Debug, Clone)]
pub struct CandidateSampler {
    /// Size of the raw random draw from the store
    pool_size: usize,

    /// Size of the final working set
    target: usize,
}

impl Default for CandidateSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSampler {
    pub fn new() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            target: DEFAULT_TARGET,
        }
    }

    /// Configure the raw draw size (default: 300)
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Configure the working set size (default: 120)
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Draw from the store and reduce the draw to the working set
    #[instrument(skip(self, store), fields(pool_size = self.pool_size, target = self.target))]
    pub async fn sample(&self, store: &dyn CatalogStore) -> Result<Vec<CatalogItem>> {
        let raw = store.sample_items(self.pool_size).await?;
        let selected = {
            let mut rng = rand::rng();
            self.select(raw, &mut rng)
        };
        info!("Sampled working set of {} items", selected.len());
        Ok(selected)
    }

    /// Reduce `items` to at most `target` items, balanced across price bands
    pub fn select<R: Rng + ?Sized>(&self, items: Vec<CatalogItem>, rng: &mut R) -> Vec<CatalogItem> {
        let quota = self.target / PRICE_BANDS.len();
        let mut selected: Vec<usize> = Vec::with_capacity(self.target);

        for band in &PRICE_BANDS {
            let in_band: Vec<usize> = (0..items.len())
                .filter(|&i| band.contains(items[i].price))
                .collect();

            if in_band.is_empty() {
                continue;
            }

            let chosen = diverse_selection(&items, &in_band, quota);
            debug!("Band {}: {} of {} items", band.label, chosen.len(), in_band.len());
            selected.extend(chosen);
        }

        if selected.len() < self.target {
            let taken: HashSet<usize> = selected.iter().copied().collect();
            let mut remaining: Vec<usize> = (0..items.len()).filter(|i| !taken.contains(i)).collect();
            remaining.shuffle(rng);
            remaining.truncate(self.target - selected.len());
            selected.extend(remaining);
        }
        selected.truncate(self.target);

        let mut slots: Vec<Option<CatalogItem>> = items.into_iter().map(Some).collect();
        selected
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }
}

/// Pick `count` of `candidates` (indices into `items`), alternating between
/// type groups and origin groups so no single group dominates.
pub fn diverse_selection(items: &[CatalogItem], candidates: &[usize], count: usize) -> Vec<usize> {
    if candidates.len() <= count {
        return candidates.to_vec();
    }

    let type_groups = group_by(items, candidates, |item| item.item_type.as_str());
    let origin_groups = group_by(items, candidates, |item| item.origin.as_str());

    let mut selected: Vec<usize> = Vec::with_capacity(count);
    let mut chosen: HashSet<usize> = HashSet::new();
    let mut type_cursor = 0;
    let mut origin_cursor = 0;
    let mut picked_this_cycle = false;

    while selected.len() < count {
        if type_cursor < type_groups.len() {
            if let Some(&i) = type_groups[type_cursor].iter().find(|i| !chosen.contains(*i)) {
                chosen.insert(i);
                selected.push(i);
                picked_this_cycle = true;
            }
            type_cursor += 1;
        }

        if selected.len() < count && origin_cursor < origin_groups.len() {
            if let Some(&i) = origin_groups[origin_cursor].iter().find(|i| !chosen.contains(*i)) {
                chosen.insert(i);
                selected.push(i);
                picked_this_cycle = true;
            }
            origin_cursor += 1;
        }

        if type_cursor >= type_groups.len() && origin_cursor >= origin_groups.len() {
            if !picked_this_cycle {
                break;
            }
            type_cursor = 0;
            origin_cursor = 0;
            picked_this_cycle = false;
        }
    }

    // Top up in catalog order if the groups ran dry
    if selected.len() < count {
        for &i in candidates {
            if selected.len() >= count {
                break;
            }
            if chosen.insert(i) {
                selected.push(i);
            }
        }
    }

    selected.truncate(count);
    selected
}

/// Group candidate indices by key, keeping first-seen key order
fn group_by<'a, F>(items: &'a [CatalogItem], candidates: &[usize], key: F) -> Vec<Vec<usize>>
where
    F: Fn(&'a CatalogItem) -> &'a str,
{
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for &i in candidates {
        let slot = *order.entry(key(&items[i])).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    groups
}
