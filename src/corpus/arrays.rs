//! `.npy` matrix loading for embeddings and reduced coordinates.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};

use crate::errors::{Result, VersemapError};

/// Load an N×D matrix, accepting float32 or float64 storage.
///
/// A missing file is reported as a missing artifact of `stage`.
pub fn load_matrix(path: &Path, stage: &'static str) -> Result<Array2<f32>> {
    if !path.exists() {
        return Err(VersemapError::MissingArtifact {
            stage,
            path: path.to_path_buf(),
        });
    }

    match Array2::<f32>::read_npy(BufReader::new(File::open(path)?)) {
        Ok(m) => Ok(m),
        Err(f32_err) => match Array2::<f64>::read_npy(BufReader::new(File::open(path)?)) {
            Ok(m) => Ok(m.mapv(|x| x as f32)),
            Err(_) => Err(f32_err.into()),
        },
    }
}

/// Load a matrix and check it has one row per verse.
pub fn load_aligned(path: &Path, stage: &'static str, n_rows: usize) -> Result<Array2<f32>> {
    let m = load_matrix(path, stage)?;
    if m.nrows() != n_rows {
        return Err(VersemapError::Shape(format!(
            "{}: {} rows in {} but {} verses",
            stage,
            m.nrows(),
            path.display(),
            n_rows
        )));
    }
    Ok(m)
}

/// Write a float32 matrix as `.npy`.
pub fn save_matrix(path: &Path, m: &Array2<f32>) -> Result<()> {
    let file = File::create(path)?;
    m.write_npy(std::io::BufWriter::new(file))?;
    Ok(())
}
