//! Unit-sphere layout of the corpus with cross-reference arcs.

pub mod arcs;
pub mod projector;
pub mod scene;
pub mod xrefs;

pub use arcs::{ArcGeometryBuilder, ArcParams, Polylines, VoteBinTrace};
pub use projector::project;
pub use scene::{build_scene, Scene, ScenePoint, SceneStats};
pub use xrefs::{read_cross_references, CrossReference, XrefSummary, XrefTable};
