//! # Sources Crate
//!
//! Candidate sourcing for the recommendation engine's fast path.
//!
//! ## Components
//!
//! ### Candidate Sampler
//! Reduces a random draw from the catalog to a balanced working set:
//! - Five fixed price bands with equal quotas
//! - Round-robin across types and origins inside each band
//! - Random padding when bands run short
//!
//! ### Sample Pool
//! Holds the working set for the life of the process and guarantees a
//! single catalog draw even under concurrent first use.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CandidateSampler, SamplePool};
//! use catalog::CatalogIndex;
//! use std::sync::Arc;
//!
//! let store = Arc::new(CatalogIndex::load_from_file(Path::new("data/catalog.json"))?);
//! let pool = SamplePool::new(store, CandidateSampler::new());
//!
//! let working_set = pool.get().await?;
//! ```

pub mod pool;
pub mod sampler;

pub use pool::SamplePool;
pub use sampler::{
    diverse_selection, CandidateSampler, PriceBand, DEFAULT_POOL_SIZE, DEFAULT_TARGET, PRICE_BANDS,
};
