//! Shared numeric helpers.

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Norms below this are treated as zero.
pub const NORM_EPS: f64 = 1e-8;

/// Euclidean norm of a row.
#[inline]
pub fn l2_norm(row: ArrayView1<'_, f32>) -> f32 {
    row.dot(&row).sqrt()
}

/// Normalize every row to unit length.
///
/// Rows whose norm is below [`NORM_EPS`] come back as all zeros.
pub fn normalize_rows(vectors: &Array2<f32>) -> Array2<f32> {
    let mut out = vectors.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let norm = l2_norm(row.view());
        if (norm as f64) < NORM_EPS {
            row.fill(0.0);
        } else {
            row.mapv_inplace(|x| x / norm);
        }
    }
    out
}

/// Normalize a single vector, epsilon-guarded like [`normalize_rows`].
pub fn normalize(v: ArrayView1<'_, f32>) -> Array1<f32> {
    let norm = l2_norm(v);
    if (norm as f64) < NORM_EPS {
        Array1::zeros(v.len())
    } else {
        v.mapv(|x| x / norm)
    }
}

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (x * scale).round() / scale
}
