//! Flat row-major byte store for quantised vectors, plus its JSON sidecar.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{normalize_and_quantize, score_row};
use crate::errors::{Result, VersemapError};
use crate::utils::normalize;

/// Item count in the sidecar; the key names what the rows are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCount {
    /// Rows are verses.
    #[serde(rename = "n_verses")]
    Verses(usize),
    /// Rows are passages.
    #[serde(rename = "n_passages")]
    Passages(usize),
}

impl ItemCount {
    /// The row count regardless of kind.
    pub fn get(&self) -> usize {
        match *self {
            ItemCount::Verses(n) | ItemCount::Passages(n) => n,
        }
    }
}

/// Sidecar describing how to read the byte file back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingMeta {
    /// Row count.
    #[serde(flatten)]
    pub count: ItemCount,
    /// Bytes per row.
    pub dim: usize,
    /// Element type tag, always "uint8".
    pub dtype: String,
    /// Embedding model identifier.
    pub model: String,
    /// Human-readable description of the mapping.
    pub note: String,
}

/// N×D quantised vectors stored as one contiguous byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedStore {
    n_items: usize,
    dim: usize,
    data: Vec<u8>,
}

impl QuantizedStore {
    /// Normalise and quantise `vectors` (one row per item).
    pub fn from_vectors(vectors: &Array2<f32>) -> Self {
        let codes = normalize_and_quantize(vectors);
        let (n_items, dim) = codes.dim();
        Self {
            n_items,
            dim,
            data: codes.into_raw_vec(),
        }
    }

    /// Wrap raw bytes; `data.len()` must equal `n_items * dim`.
    pub fn from_bytes(n_items: usize, dim: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != n_items * dim {
            return Err(VersemapError::Shape(format!(
                "expected {} x {} = {} bytes, got {}",
                n_items,
                dim,
                n_items * dim,
                data.len()
            )));
        }
        Ok(Self { n_items, dim, data })
    }

    /// Number of rows.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Bytes per row.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The whole buffer, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One row.
    pub fn row(&self, i: usize) -> &[u8] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Sidecar for this store.
    pub fn meta(&self, count: fn(usize) -> ItemCount, model: &str, note: &str) -> EncodingMeta {
        EncodingMeta {
            count: count(self.n_items),
            dim: self.dim,
            dtype: "uint8".to_string(),
            model: model.to_string(),
            note: note.to_string(),
        }
    }

    /// Cosine-style score of `query` against every row.
    ///
    /// The query is normalised first; rows are dequantised on the fly.
    pub fn score(&self, query: ArrayView1<'_, f32>) -> Result<Vec<f32>> {
        if query.len() != self.dim {
            return Err(VersemapError::Shape(format!(
                "query has {} dims, store has {}",
                query.len(),
                self.dim
            )));
        }
        let q = normalize(query);
        Ok((0..self.n_items)
            .into_par_iter()
            .map(|i| score_row(q.view(), self.row(i)))
            .collect())
    }

    /// The `k` best rows for `query`, best first, ties by lower index.
    pub fn search(&self, query: ArrayView1<'_, f32>, k: usize) -> Result<Vec<(usize, f32)>> {
        let scores = self.score(query)?;
        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        Ok(ranked)
    }

    /// Write the byte file and its JSON sidecar.
    pub fn write(&self, bin_path: &Path, meta_path: &Path, meta: &EncodingMeta) -> Result<()> {
        let mut w = BufWriter::new(File::create(bin_path)?);
        w.write_all(&self.data)?;
        w.flush()?;

        let meta_file = File::create(meta_path)?;
        serde_json::to_writer(BufWriter::new(meta_file), meta)?;
        Ok(())
    }

    /// Read a store back using its sidecar for the shape.
    pub fn read(bin_path: &Path, meta_path: &Path) -> Result<(Self, EncodingMeta)> {
        let meta: EncodingMeta = serde_json::from_reader(BufReader::new(File::open(meta_path)?))?;
        let data = std::fs::read(bin_path)?;
        let store = Self::from_bytes(meta.count.get(), meta.dim, data)?;
        Ok((store, meta))
    }
}
