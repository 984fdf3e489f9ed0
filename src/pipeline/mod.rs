//! Pipeline stages over a data directory.
//!
//! Every stage reads its inputs from the data directory, fails with
//! [`VersemapError::MissingArtifact`] when an upstream artifact is absent,
//! and writes its outputs next to them.

pub mod neighbors;
pub mod passages;
pub mod search;
pub mod site;
pub mod sphere;

pub use neighbors::NeighborStage;
pub use passages::PassageStage;
pub use search::SearchExportStage;
pub use site::SiteStage;
pub use sphere::SphereStage;

use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{error, info};

use crate::corpus::arrays::load_aligned;
use crate::corpus::VerseTable;
use crate::errors::{Result, VersemapError};

/// Artifact file names inside the data directory.
pub mod files {
    /// Verse records.
    pub const VERSES: &str = "verses.json";
    /// N×D verse embeddings.
    pub const EMBEDDINGS: &str = "embeddings.npy";
    /// N×3 reduced coordinates.
    pub const UMAP3D: &str = "umap3d.npy";
    /// Top-K neighbor table.
    pub const NEIGHBORS: &str = "neighbors.json";
    /// Book×book similarity.
    pub const HEATMAP: &str = "heatmap.json";
    /// Quantised verse store.
    pub const SEARCH_EMBEDDINGS: &str = "search_embeddings.bin";
    /// Sidecar for [`SEARCH_EMBEDDINGS`].
    pub const SEARCH_META: &str = "search_meta.json";
    /// Pericope boundary table.
    pub const PERICOPES: &str = "pericopes_raw.csv";
    /// Passage manifest.
    pub const PASSAGES: &str = "passages.json";
    /// Quantised passage store.
    pub const PASSAGE_EMBEDDINGS: &str = "passage_embeddings.bin";
    /// Sidecar for [`PASSAGE_EMBEDDINGS`].
    pub const PASSAGE_META: &str = "passage_meta.json";
    /// Cross-reference table.
    pub const CROSS_REFERENCES: &str = "cross_references.csv";
    /// Sphere scene.
    pub const SPHERE: &str = "sphere.json";
    /// Secondary translation texts, index-aligned with verses.
    pub const BSB_VERSES: &str = "bsb_verses.json";
    /// Memoised intermediates.
    pub const CACHE_DIR: &str = "cache";

    /// Everything the site reads, in staging order.
    pub const SITE_ARTIFACTS: &[&str] = &[
        VERSES,
        "umap_coords.json",
        NEIGHBORS,
        "graph.json",
        "metrics.json",
        HEATMAP,
        "hapax.json",
        SPHERE,
        SEARCH_EMBEDDINGS,
        SEARCH_META,
        PASSAGES,
        PASSAGE_EMBEDDINGS,
        PASSAGE_META,
        BSB_VERSES,
    ];
}

/// Root of the pipeline's artifacts.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Wrap a directory path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a named artifact.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path of an input that must already exist.
    pub fn require(&self, name: &str, stage: &'static str) -> Result<PathBuf> {
        let path = self.path(name);
        if path.exists() {
            Ok(path)
        } else {
            Err(VersemapError::MissingArtifact { stage, path })
        }
    }

    /// Verses plus their aligned embedding matrix.
    pub fn load_corpus(&self, stage: &'static str) -> Result<(VerseTable, Array2<f32>)> {
        let verses = VerseTable::load(&self.require(files::VERSES, stage)?)?;
        let embeddings = load_aligned(&self.path(files::EMBEDDINGS), stage, verses.len())?;
        info!(
            "{}: {} verses, {}-dim embeddings",
            stage,
            verses.len(),
            embeddings.ncols()
        );
        Ok((verses, embeddings))
    }
}

/// A unit of pipeline work.
pub trait Stage {
    /// Short name used in logs and the CLI.
    fn name(&self) -> &'static str;

    /// Read inputs from `data`, compute, write outputs.
    fn run(&self, data: &DataDir) -> anyhow::Result<()>;
}

/// Run `stages` in order. A failed stage is logged and the rest still run.
///
/// Returns the names of the stages that failed.
pub fn run_stages(stages: &[&dyn Stage], data: &DataDir) -> Vec<&'static str> {
    let mut failed = Vec::new();
    for stage in stages {
        info!("== {} ==", stage.name());
        if let Err(e) = stage.run(data) {
            error!("{} failed: {:#}", stage.name(), e);
            failed.push(stage.name());
        }
    }
    failed
}
