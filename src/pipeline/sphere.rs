//! Sphere scene and secondary translation export.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use super::{files, DataDir, Stage};
use crate::config::PipelineConfig;
use crate::corpus::arrays::load_aligned;
use crate::corpus::BookCatalog;
use crate::persistence::write_json;
use crate::sphere::{build_scene, read_cross_references};

/// Writes `sphere.json` and `bsb_verses.json`.
#[derive(Debug, Clone)]
pub struct SphereStage {
    config: PipelineConfig,
    catalog: Arc<BookCatalog>,
}

impl SphereStage {
    /// New stage.
    pub fn new(config: PipelineConfig, catalog: Arc<BookCatalog>) -> Self {
        Self { config, catalog }
    }
}

impl Stage for SphereStage {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn run(&self, data: &DataDir) -> Result<()> {
        let (verses, embeddings) = data.load_corpus(self.name())?;
        let coords = load_aligned(&data.path(files::UMAP3D), self.name(), verses.len())?;

        let csv_path = data.require(files::CROSS_REFERENCES, self.name())?;
        let xrefs = read_cross_references(
            BufReader::new(File::open(&csv_path)?),
            &self.catalog,
            &verses,
        )?;
        if xrefs.malformed + xrefs.unresolved > 0 {
            warn!(
                "cross-references: {} malformed rows, {} unresolved verses",
                xrefs.malformed, xrefs.unresolved
            );
        }

        let scene = build_scene(
            &self.config,
            &self.catalog,
            &verses,
            &embeddings,
            &coords,
            &xrefs,
        )?;
        write_json(&data.path(files::SPHERE), &scene)?;

        let bsb: Vec<&str> = verses
            .verses()
            .iter()
            .map(|v| v.text_bsb.as_deref().unwrap_or(""))
            .collect();
        let with_bsb = bsb.iter().filter(|t| !t.is_empty()).count();
        info!("{} of {} verses carry a secondary translation", with_bsb, bsb.len());
        write_json(&data.path(files::BSB_VERSES), &bsb)?;
        Ok(())
    }
}
