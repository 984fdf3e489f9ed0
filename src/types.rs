//! Common core types used across the pipeline.

use serde::{Deserialize, Serialize};

/// Dense zero-based verse index.
pub type VerseId = usize;

/// One neighbor of a verse: (other id, cosine similarity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor(pub VerseId, pub f64);

/// Ranked neighbors of one verse, most similar first.
pub type NeighborEntry = Vec<Neighbor>;

/// A point on the unit sphere.
pub type SpherePoint = [f64; 3];
