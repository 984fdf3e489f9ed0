//! Order-preserving 8-bit encoding of embedding vectors.
//!
//! Every vector is L2-normalised, then each component in `[-1, 1]` goes
//! through the same affine map onto `[0, 255]`:
//!
//! ```text
//! byte = clamp(round((x + 1.0) * 127.5), 0, 255)
//! x'   = byte / 127.5 - 1.0
//! ```
//!
//! Because the map is shared across the whole batch, the dot product of a
//! query with dequantised rows ranks rows the same way the float vectors
//! do, up to ~1/128 error per component.

mod store;

pub use store::{EncodingMeta, ItemCount, QuantizedStore};

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

use crate::utils::normalize_rows;

/// Scale of the affine map.
pub const QUANT_SCALE: f32 = 127.5;

/// Map one normalised component to a byte.
#[inline]
pub fn quantize_component(x: f32) -> u8 {
    ((x + 1.0) * QUANT_SCALE).round().clamp(0.0, 255.0) as u8
}

/// Approximate inverse of [`quantize_component`].
#[inline]
pub fn dequantize(byte: u8) -> f32 {
    byte as f32 / QUANT_SCALE - 1.0
}

/// Normalise each row and quantise it. Output has the input's shape.
///
/// Never fails; zero rows encode as all-128.
pub fn normalize_and_quantize(vectors: &Array2<f32>) -> Array2<u8> {
    let normed = normalize_rows(vectors);
    let (n, dim) = normed.dim();

    let rows: Vec<Vec<u8>> = (0..n)
        .into_par_iter()
        .map(|i| normed.row(i).iter().map(|&x| quantize_component(x)).collect())
        .collect();

    Array2::from_shape_fn((n, dim), |(i, j)| rows[i][j])
}

/// Dot product of a float query against a quantised row, dequantising on the fly.
#[inline]
pub fn score_row(query: ArrayView1<'_, f32>, row: &[u8]) -> f32 {
    query
        .iter()
        .zip(row)
        .map(|(&q, &b)| q * dequantize(b))
        .sum()
}

/// Similarity of two quantised vectors, both dequantised.
pub fn quantized_similarity(a: &[u8], b: &[u8]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| dequantize(x) * dequantize(y))
        .sum()
}
