//! Neighbor table and book heatmap.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{files, DataDir, Stage};
use crate::cache::{ArtifactCache, CacheKey, DirCache};
use crate::config::PipelineConfig;
use crate::corpus::BookCatalog;
use crate::neighbors::{top_k_neighbors, NeighborParams};
use crate::persistence::write_json;
use crate::summary::book_heatmap;
use crate::types::NeighborEntry;

/// Writes `neighbors.json` (memoised) and `heatmap.json`.
#[derive(Debug, Clone)]
pub struct NeighborStage<C = DirCache> {
    config: PipelineConfig,
    catalog: Arc<BookCatalog>,
    cache: C,
}

impl NeighborStage<DirCache> {
    /// Stage caching under `<data>/cache`.
    pub fn new(config: PipelineConfig, catalog: Arc<BookCatalog>, data: &DataDir) -> Self {
        Self::with_cache(config, catalog, DirCache::new(data.path(files::CACHE_DIR)))
    }
}

impl<C: ArtifactCache> NeighborStage<C> {
    /// Stage with an explicit cache.
    pub fn with_cache(config: PipelineConfig, catalog: Arc<BookCatalog>, cache: C) -> Self {
        Self {
            config,
            catalog,
            cache,
        }
    }

    fn params(&self) -> NeighborParams {
        NeighborParams {
            k: self.config.top_k,
            batch_size: self.config.neighbor_batch_size,
            decimals: self.config.similarity_decimals,
        }
    }
}

impl<C: ArtifactCache> Stage for NeighborStage<C> {
    fn name(&self) -> &'static str {
        "neighbors"
    }

    fn run(&self, data: &DataDir) -> Result<()> {
        let (verses, embeddings) = data.load_corpus(self.name())?;
        let params = self.params();

        // Batch size never changes the table, so it stays out of the key.
        let key = CacheKey::builder("neighbors")
            .matrix(&embeddings)
            .param("k", params.k)
            .param("decimals", params.decimals)
            .finish();
        let table: Vec<NeighborEntry> = self
            .cache
            .get_or_compute(&key, || top_k_neighbors(&embeddings, params))?;
        info!("top-{} neighbors for {} verses", params.k, table.len());
        write_json(&data.path(files::NEIGHBORS), &table)?;

        let heatmap = book_heatmap(
            &self.catalog,
            &verses,
            &embeddings,
            self.config.similarity_decimals,
        )?;
        info!("{}x{} book heatmap", heatmap.books.len(), heatmap.books.len());
        write_json(&data.path(files::HEATMAP), &heatmap)?;
        Ok(())
    }
}
