//! Process-wide working set for the fast path.
//!
//! The pool is drawn lazily on first use. Concurrent first callers share a
//! single in-flight draw: the store is queried once no matter how many
//! requests race to initialize it.

use crate::sampler::CandidateSampler;
use catalog::{CatalogError, CatalogItem, CatalogStore, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

pub struct SamplePool {
    store: Arc<dyn CatalogStore>,
    sampler: CandidateSampler,
    cell: OnceCell<Arc<Vec<CatalogItem>>>,
}

impl SamplePool {
    pub fn new(store: Arc<dyn CatalogStore>, sampler: CandidateSampler) -> Self {
        Self {
            store,
            sampler,
            cell: OnceCell::new(),
        }
    }

    /// The working set, drawing it first if this is the first call.
    ///
    /// A failed or empty draw is not cached; the next call retries.
    pub async fn get(&self) -> Result<Arc<Vec<CatalogItem>>> {
        let pool = self
            .cell
            .get_or_try_init(|| async {
                let items = self.sampler.sample(self.store.as_ref()).await?;
                if items.is_empty() {
                    warn!("Catalog returned no items for the working set");
                    return Err(CatalogError::Unavailable("catalog sample was empty".to_string()));
                }
                info!("Working set initialized with {} items", items.len());
                Ok(Arc::new(items))
            })
            .await?;

        Ok(Arc::clone(pool))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }
}
