//! Export the quantised verse store for client-side search.

use anyhow::Result;
use tracing::info;

use super::{files, DataDir, Stage};
use crate::codec::{ItemCount, QuantizedStore};
use crate::config::PipelineConfig;

const NOTE: &str = "L2-normalised, then affine-quantised [-1,1]→[0,255]";

/// Writes `search_embeddings.bin` and `search_meta.json`.
#[derive(Debug, Clone)]
pub struct SearchExportStage {
    config: PipelineConfig,
}

impl SearchExportStage {
    /// Stage using the configured model id in the sidecar.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }
}

impl Stage for SearchExportStage {
    fn name(&self) -> &'static str {
        "search"
    }

    fn run(&self, data: &DataDir) -> Result<()> {
        let (_, embeddings) = data.load_corpus(self.name())?;

        let store = QuantizedStore::from_vectors(&embeddings);
        let meta = store.meta(ItemCount::Verses, &self.config.model, NOTE);
        let bin = data.path(files::SEARCH_EMBEDDINGS);
        store.write(&bin, &data.path(files::SEARCH_META), &meta)?;

        info!(
            "{}x{} -> {} ({:.1} MB)",
            store.n_items(),
            store.dim(),
            bin.display(),
            store.as_bytes().len() as f64 / 1e6
        );
        Ok(())
    }
}
