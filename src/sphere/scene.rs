//! Assemble the renderable sphere scene.

use ndarray::Array2;
use serde::Serialize;
use tracing::info;

use super::arcs::{ArcGeometryBuilder, VoteBinTrace};
use super::projector::project;
use super::xrefs::{rendered, XrefSummary, XrefTable};
use crate::config::PipelineConfig;
use crate::corpus::{BookCatalog, Testament, VerseTable};
use crate::errors::{Result, VersemapError};
use crate::summary::{representative_verses, RepresentativeVerse};
use crate::utils::round_to;

/// One verse on the sphere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePoint {
    /// Verse reference.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Verse text.
    pub text: String,
    /// Book name.
    pub book: String,
    /// Book number.
    pub book_num: u32,
    /// Testament.
    pub testament: Testament,
    /// Sphere x.
    pub sx: f64,
    /// Sphere y.
    pub sy: f64,
    /// Sphere z.
    pub sz: f64,
}

/// Corpus and arc counts for diagnostics and captions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    /// Verses in the corpus.
    pub total_verses: usize,
    /// Books in the catalog.
    pub books: usize,
    /// Old Testament verses.
    pub ot_verses: usize,
    /// New Testament verses.
    pub nt_verses: usize,
    /// Pairs meeting the vote threshold.
    pub arcs_rendered: usize,
    /// Unique pairs in the dataset.
    pub arcs_in_dataset: usize,
    /// Unique same-testament pairs in the dataset.
    pub dataset_intra: usize,
    /// Unique cross-testament pairs in the dataset.
    pub dataset_inter: usize,
    /// Binned cross-testament arcs.
    pub arcs_cross: usize,
    /// `arcs_rendered - arcs_cross`.
    pub arcs_same: usize,
}

/// Everything the front end needs to draw the sphere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// Per-verse points, index-aligned with verse ids.
    pub points: Vec<ScenePoint>,
    /// Arc traces per vote bin.
    pub vote_bins: Vec<VoteBinTrace>,
    /// Most typical verse per book.
    pub representative_verses: Vec<RepresentativeVerse>,
    /// Counts.
    pub stats: SceneStats,
}

/// Project `coords3` onto the sphere, draw the cross-reference arcs and
/// collect per-book representatives.
pub fn build_scene(
    config: &PipelineConfig,
    catalog: &BookCatalog,
    verses: &VerseTable,
    embeddings: &Array2<f32>,
    coords3: &Array2<f32>,
    xrefs: &XrefTable,
) -> Result<Scene> {
    if coords3.nrows() != verses.len() {
        return Err(VersemapError::Shape(format!(
            "{} reduced points vs {} verses",
            coords3.nrows(),
            verses.len()
        )));
    }

    let sphere = project(coords3)?;
    info!("{} verses projected to unit sphere", sphere.len());

    let summary = XrefSummary::of(&xrefs.refs);
    let arcs = rendered(&xrefs.refs, config.min_votes);
    info!(
        "{} unique cross-references in dataset ({} intra, {} inter), {} with votes >= {}",
        summary.total_unique,
        summary.dataset_intra,
        summary.dataset_inter,
        arcs.len(),
        config.min_votes
    );

    let vote_bins = ArcGeometryBuilder::new(config).build(&arcs, &sphere);
    for b in &vote_bins {
        let n = b.count_intra + b.count_inter;
        if n > 0 {
            info!(
                "votes {}: {} arcs ({} intra, {} inter-testament)",
                b.label, n, b.count_intra, b.count_inter
            );
        }
    }
    let arcs_cross: usize = vote_bins.iter().map(|b| b.count_inter).sum();

    let d = config.point_decimals;
    let points = verses
        .verses()
        .iter()
        .zip(&sphere)
        .map(|(v, p)| ScenePoint {
            reference: v.reference.clone(),
            text: v.text.clone(),
            book: v.book.clone(),
            book_num: v.book_num,
            testament: v.testament,
            sx: round_to(p[0], d),
            sy: round_to(p[1], d),
            sz: round_to(p[2], d),
        })
        .collect();

    let representative_verses =
        representative_verses(catalog, verses, embeddings, config.similarity_decimals)?;
    info!("{} representative verses computed", representative_verses.len());

    let (ot, nt) = verses.testament_counts();
    let stats = SceneStats {
        total_verses: verses.len(),
        books: catalog.len(),
        ot_verses: ot,
        nt_verses: nt,
        arcs_rendered: arcs.len(),
        arcs_in_dataset: summary.total_unique,
        dataset_intra: summary.dataset_intra,
        dataset_inter: summary.dataset_inter,
        arcs_cross,
        arcs_same: arcs.len().saturating_sub(arcs_cross),
    };

    Ok(Scene {
        points,
        vote_bins,
        representative_verses,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::verses::fixtures::sample_table;
    use crate::sphere::xrefs::{dedup_max_votes, CrossReference};
    use ndarray::array;

    #[test]
    fn test_scene_stats() {
        let table = sample_table();
        let catalog = BookCatalog::standard();
        let emb = Array2::<f32>::ones((7, 4));
        let coords = array![
            [1.0f32, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
            [0.0, 0.0, 0.0]
        ];
        let xrefs = XrefTable {
            refs: dedup_max_votes(vec![
                CrossReference::new(0, 5, 120, true).unwrap(),
                CrossReference::new(0, 2, 25, false).unwrap(),
                CrossReference::new(1, 3, 5, false).unwrap(),
            ]),
            malformed: 0,
            unresolved: 0,
        };

        let config = PipelineConfig::default();
        let scene = build_scene(&config, &catalog, &table, &emb, &coords, &xrefs).unwrap();

        assert_eq!(scene.points.len(), 7);
        assert_eq!(scene.points[0].sx, 1.0);
        assert_eq!(scene.stats.arcs_in_dataset, 3);
        assert_eq!(scene.stats.arcs_rendered, 2);
        assert_eq!(scene.stats.arcs_cross, 1);
        assert_eq!(scene.stats.arcs_same, 1);
        assert_eq!(scene.stats.dataset_inter, 1);
        assert_eq!((scene.stats.ot_verses, scene.stats.nt_verses), (5, 2));
        assert_eq!(scene.vote_bins[0].count_intra, 1);
        assert_eq!(scene.vote_bins[3].count_inter, 1);
        assert_eq!(scene.representative_verses.len(), 3);

        let json = serde_json::to_value(&scene).unwrap();
        assert!(json["vote_bins"][0]["intra"]["x"][31].is_null());
        assert_eq!(json["vote_bins"][0]["vote_min"], 20);
    }

    #[test]
    fn test_misaligned_coords() {
        let table = sample_table();
        let catalog = BookCatalog::standard();
        let emb = Array2::<f32>::ones((7, 4));
        let coords = Array2::<f32>::ones((3, 3));
        let config = PipelineConfig::default();
        let err = build_scene(&config, &catalog, &table, &emb, &coords, &XrefTable::default());
        assert!(err.is_err());
    }
}
