//! Project a 3-D point cloud onto the unit sphere.

use ndarray::{Array2, Axis};

use crate::errors::{Result, VersemapError};
use crate::types::SpherePoint;
use crate::utils::NORM_EPS;

/// Center the cloud on its mean, then scale every point to unit length.
///
/// Output is index-aligned with the input. Points that sit on the mean are
/// left at the origin rather than divided by ~0.
pub fn project(coords: &Array2<f32>) -> Result<Vec<SpherePoint>> {
    if coords.ncols() != 3 {
        return Err(VersemapError::Shape(format!(
            "sphere projection needs 3 columns, got {}",
            coords.ncols()
        )));
    }
    if coords.nrows() == 0 {
        return Ok(Vec::new());
    }

    let coords = coords.mapv(|x| x as f64);
    let mean = coords
        .mean_axis(Axis(0))
        .ok_or_else(|| VersemapError::Shape("empty point cloud".into()))?;

    Ok(coords
        .axis_iter(Axis(0))
        .map(|row| {
            let c = [row[0] - mean[0], row[1] - mean[1], row[2] - mean[2]];
            let norm = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
            if norm < NORM_EPS {
                [0.0; 3]
            } else {
                [c[0] / norm, c[1] / norm, c[2] / norm]
            }
        })
        .collect())
}
