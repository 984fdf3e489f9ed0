//! Mean pooling of verse vectors into one passage vector.

use ndarray::{Array1, Array2};

use crate::errors::{Result, VersemapError};
use crate::types::VerseId;

/// Component-wise mean of the member rows of `vectors`.
///
/// No normalisation happens here; the codec normalises passage vectors
/// when they are quantised.
pub fn pool(members: &[VerseId], vectors: &Array2<f32>) -> Result<Array1<f32>> {
    if members.is_empty() {
        return Err(VersemapError::EmptyPassage);
    }

    let n = vectors.nrows();
    let mut sum = Array1::<f32>::zeros(vectors.ncols());
    for &id in members {
        if id >= n {
            return Err(VersemapError::InvalidArgument(format!(
                "verse id {} out of range for {} vectors",
                id, n
            )));
        }
        sum += &vectors.row(id);
    }

    Ok(sum / members.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_mean_not_sum_not_normalized() {
        let v = array![[2.0f32, 0.0], [0.0, 2.0], [2.0, 2.0]];
        let pooled = pool(&[0, 1, 2], &v).unwrap();
        assert_abs_diff_eq!(pooled[0], 1.3333334, epsilon = 1e-6);
        assert_abs_diff_eq!(pooled[1], 1.3333334, epsilon = 1e-6);
        assert_eq!((pooled[0] * 100.0).round() / 100.0, 1.33);
    }

    #[test]
    fn test_subset_and_order_independent() {
        let v = array![[1.0f32, 5.0], [3.0, 1.0], [100.0, 100.0]];
        assert_eq!(pool(&[0, 1], &v).unwrap(), array![2.0f32, 3.0]);
        assert_eq!(pool(&[1, 0], &v).unwrap(), array![2.0f32, 3.0]);
    }

    #[test]
    fn test_empty_passage() {
        let v = array![[1.0f32]];
        assert!(matches!(pool(&[], &v), Err(VersemapError::EmptyPassage)));
    }

    #[test]
    fn test_out_of_range() {
        let v = array![[1.0f32]];
        assert!(pool(&[3], &v).is_err());
    }
}
