//! Exact top-K cosine neighbors over the whole corpus.
//!
//! Rows are processed in fixed-size batches. Each batch is one matrix
//! product of its unit rows against the whole normalised corpus, giving a
//! `batch_size × N` similarity block, so `batch_size` bounds peak memory.
//! Every block element is accumulated the same way whatever the block's
//! height, so the batch size never changes the output.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis, Slice};
use rayon::prelude::*;

use crate::errors::{Result, VersemapError};
use crate::types::{Neighbor, NeighborEntry, VerseId};
use crate::utils::{normalize_rows, round_to};

/// Written over a row's self-similarity; below any valid cosine.
pub const SELF_SENTINEL: f32 = -2.0;

/// Parameters for [`top_k_neighbors`].
#[derive(Debug, Clone, Copy)]
pub struct NeighborParams {
    /// Neighbors per row.
    pub k: usize,
    /// Rows per similarity batch.
    pub batch_size: usize,
    /// Decimal places kept on similarities.
    pub decimals: u32,
}

impl Default for NeighborParams {
    fn default() -> Self {
        Self {
            k: 8,
            batch_size: 500,
            decimals: 4,
        }
    }
}

// Higher similarity first, then lower index.
#[inline]
fn rank(a: &(VerseId, f32), b: &(VerseId, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Top `k` of one similarity row, excluding `self_idx`.
fn top_k_row(sims: ArrayView1<'_, f32>, self_idx: VerseId, k: usize, decimals: u32) -> NeighborEntry {
    if k == 0 {
        return Vec::new();
    }

    let mut cands: Vec<(VerseId, f32)> = sims
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != self_idx)
        // + 0.0 folds -0.0 into 0.0 so total_cmp sees them as equal
        .map(|(j, &s)| (j, s + 0.0))
        .collect();

    if cands.len() > k {
        cands.select_nth_unstable_by(k - 1, rank);
        cands.truncate(k);
    }
    cands.sort_by(rank);

    cands
        .into_iter()
        .map(|(j, s)| Neighbor(j, round_to(s as f64, decimals)))
        .collect()
}

/// Similarities of rows `start..end` of `normed` against every row, with
/// each row's own column set to [`SELF_SENTINEL`].
pub(crate) fn similarity_block(normed: &Array2<f32>, start: usize, end: usize) -> Array2<f32> {
    let mut sims = normed
        .slice_axis(Axis(0), Slice::from(start..end))
        .dot(&normed.t());
    for r in 0..end - start {
        sims[[r, start + r]] = SELF_SENTINEL;
    }
    sims
}

/// For every row of `vectors`, its `k` most cosine-similar other rows.
///
/// Output is index-aligned with the input; each entry is sorted by
/// descending similarity (ties by lower index) and never contains the row
/// itself. When `k` exceeds `N - 1` every other row is returned.
pub fn top_k_neighbors(vectors: &Array2<f32>, params: NeighborParams) -> Result<Vec<NeighborEntry>> {
    if params.k == 0 {
        return Err(VersemapError::InvalidArgument("k must be >= 1".into()));
    }
    if params.batch_size == 0 {
        return Err(VersemapError::InvalidArgument(
            "batch_size must be >= 1".into(),
        ));
    }

    let normed = normalize_rows(vectors);
    let n = normed.nrows();
    let k = params.k.min(n.saturating_sub(1));

    let mut out = Vec::with_capacity(n);
    for start in (0..n).step_by(params.batch_size) {
        let end = (start + params.batch_size).min(n);
        let sims = similarity_block(&normed, start, end);
        let block: Vec<NeighborEntry> = (0..end - start)
            .into_par_iter()
            .map(|r| top_k_row(sims.row(r), start + r, k, params.decimals))
            .collect();
        out.extend(block);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn params(k: usize, batch_size: usize) -> NeighborParams {
        NeighborParams {
            k,
            batch_size,
            decimals: 4,
        }
    }

    fn random_corpus(n: usize, dim: usize, seed: u64) -> Array2<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array2::from_shape_fn((n, dim), |_| rng.gen::<f32>() - 0.5)
    }

    #[test]
    fn test_toy_corpus_k1() {
        let v = array![[1.0f32, 0.0], [0.9, 0.1], [-1.0, 0.0], [0.0, 1.0]];
        let nb = top_k_neighbors(&v, params(1, 500)).unwrap();

        assert_eq!(nb.len(), 4);
        assert_eq!(nb[0][0].0, 1);
        assert_eq!(nb[1][0].0, 0);
        // [-1, 0] is orthogonal to [0, 1] (cos 0) and opposite to the others.
        assert_eq!(nb[2][0], Neighbor(3, 0.0));
        assert_eq!(nb[3][0].0, 1);
        assert!((nb[0][0].1 - 0.9939).abs() < 1e-9);
    }

    #[test]
    fn test_toy_corpus_full_ranking() {
        let v = array![[1.0f32, 0.0], [0.9, 0.1], [-1.0, 0.0], [0.0, 1.0]];
        let nb = top_k_neighbors(&v, params(3, 2)).unwrap();
        let ids: Vec<Vec<usize>> = nb.iter().map(|e| e.iter().map(|n| n.0).collect()).collect();
        assert_eq!(ids[0], vec![1, 3, 2]);
        assert_eq!(ids[1], vec![0, 3, 2]);
        assert_eq!(ids[2], vec![3, 1, 0]);
        assert_eq!(ids[3], vec![1, 0, 2]);
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let v = array![[1.0f32, 0.0], [0.0, 1.0], [0.0, -1.0], [0.0, 2.0]];
        let nb = top_k_neighbors(&v, params(2, 500)).unwrap();
        // Rows 1, 2, 3 are all orthogonal to row 0.
        assert_eq!(nb[0], vec![Neighbor(1, 0.0), Neighbor(2, 0.0)]);
    }

    #[test]
    fn test_batch_size_invariance() {
        let v = random_corpus(137, 24, 3);
        let reference = top_k_neighbors(&v, params(5, 500)).unwrap();
        for bs in [1, 2, 7, 64, 136, 137, 1000] {
            assert_eq!(top_k_neighbors(&v, params(5, bs)).unwrap(), reference, "batch {}", bs);
        }
    }

    #[test]
    fn test_self_excluded_and_sorted() {
        let v = random_corpus(60, 8, 9);
        let nb = top_k_neighbors(&v, params(8, 16)).unwrap();
        for (i, entry) in nb.iter().enumerate() {
            assert_eq!(entry.len(), 8);
            assert!(entry.iter().all(|n| n.0 != i));
            for w in entry.windows(2) {
                assert!(w[0].1 >= w[1].1);
            }
        }
    }

    #[test]
    fn test_duplicate_rows_never_pick_self() {
        let v = array![[1.0f32, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let nb = top_k_neighbors(&v, params(5, 1)).unwrap();
        assert_eq!(nb[1].iter().map(|n| n.0).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_matches_brute_force() {
        let v = random_corpus(50, 10, 21);
        let normed = normalize_rows(&v);
        let full = normed.dot(&normed.t());
        let nb = top_k_neighbors(&v, params(3, 8)).unwrap();
        for i in 0..50 {
            let mut all: Vec<(usize, f32)> = (0..50)
                .filter(|&j| j != i)
                .map(|j| (j, full[[i, j]] + 0.0))
                .collect();
            all.sort_by(rank);
            let expected: Vec<usize> = all.iter().take(3).map(|p| p.0).collect();
            let got: Vec<usize> = nb[i].iter().map(|n| n.0).collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_similarity_block_shape_and_self_column() {
        let v = random_corpus(20, 6, 5);
        let normed = normalize_rows(&v);
        let full = normed.dot(&normed.t());

        let block = similarity_block(&normed, 7, 12);
        assert_eq!(block.dim(), (5, 20));
        for r in 0..5 {
            for j in 0..20 {
                if j == 7 + r {
                    assert_eq!(block[[r, j]], SELF_SENTINEL);
                } else {
                    assert_eq!(block[[r, j]], full[[7 + r, j]]);
                }
            }
        }
    }

    #[test]
    fn test_single_row_and_bad_args() {
        let v = array![[1.0f32, 2.0]];
        assert_eq!(top_k_neighbors(&v, params(4, 10)).unwrap(), vec![vec![]]);
        assert!(top_k_neighbors(&v, params(0, 10)).is_err());
        assert!(top_k_neighbors(&v, params(1, 0)).is_err());
    }

    #[test]
    fn test_zero_vector_row() {
        let v = array![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let nb = top_k_neighbors(&v, params(2, 2)).unwrap();
        assert!(nb[0].iter().all(|n| n.1 == 0.0 && n.0 != 0));
    }
}
