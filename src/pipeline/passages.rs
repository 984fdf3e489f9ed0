//! Passage manifest and pooled passage store.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use super::{files, DataDir, Stage};
use crate::codec::{ItemCount, QuantizedStore};
use crate::config::PipelineConfig;
use crate::corpus::BookCatalog;
use crate::passages::{build_passages, read_boundaries};
use crate::persistence::write_json;

const NOTE: &str = "Mean of verse embeddings, L2-normalised, affine-quantised [-1,1]→[0,255]";

/// Writes `passages.json`, `passage_embeddings.bin` and `passage_meta.json`.
#[derive(Debug, Clone)]
pub struct PassageStage {
    config: PipelineConfig,
    catalog: Arc<BookCatalog>,
}

impl PassageStage {
    /// New stage.
    pub fn new(config: PipelineConfig, catalog: Arc<BookCatalog>) -> Self {
        Self { config, catalog }
    }
}

impl Stage for PassageStage {
    fn name(&self) -> &'static str {
        "passages"
    }

    fn run(&self, data: &DataDir) -> Result<()> {
        let (verses, embeddings) = data.load_corpus(self.name())?;

        let csv_path = data.require(files::PERICOPES, self.name())?;
        let (boundaries, unparsable) = read_boundaries(BufReader::new(File::open(&csv_path)?))?;
        info!("{} pericope rows ({} unparsable)", boundaries.len(), unparsable);

        let set = build_passages(&boundaries, &self.catalog, &verses, &embeddings)?;
        if set.skipped > 0 {
            warn!("{} pericopes did not resolve to any verse", set.skipped);
        }
        info!("{} passages", set.passages.len());
        write_json(&data.path(files::PASSAGES), &set.passages)?;

        let store = QuantizedStore::from_vectors(&set.embeddings);
        let meta = store.meta(ItemCount::Passages, &self.config.model, NOTE);
        store.write(
            &data.path(files::PASSAGE_EMBEDDINGS),
            &data.path(files::PASSAGE_META),
            &meta,
        )?;
        info!("{}x{} passage store", store.n_items(), store.dim());
        Ok(())
    }
}
