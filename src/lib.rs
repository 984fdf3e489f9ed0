#![forbid(unsafe_code)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]

//! # versemap-core
//!
//! Embedding geometry and similarity artifacts for a scripture
//! visualisation front end:
//! - order-preserving 8-bit quantisation of unit embeddings
//! - batched exact top-K cosine neighbors
//! - unit-sphere projection with cross-reference arcs binned by votes
//! - mean-pooled passage embeddings
//!
//! Outputs are deterministic for identical inputs.

pub mod cache;
pub mod codec;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod neighbors;
pub mod passages;
/// Artifact writers and site staging.
pub mod persistence;
/// Stage drivers over a data directory.
pub mod pipeline;
pub mod sphere;
pub mod summary;
pub mod types;
pub mod utils;

pub use cache::{ArtifactCache, CacheKey, DirCache, MemoryCache};
pub use codec::{normalize_and_quantize, QuantizedStore};
pub use config::PipelineConfig;
pub use corpus::{BookCatalog, VerseTable};
pub use errors::{Result, VersemapError};
pub use neighbors::{top_k_neighbors, NeighborParams};
pub use passages::{build_passages, pool};
pub use sphere::{build_scene, project, Scene};
pub use types::{Neighbor, NeighborEntry, SpherePoint, VerseId};
