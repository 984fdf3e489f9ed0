//! Key-addressed memoisation of expensive intermediates.
//!
//! A stage asks the cache for a value by key and supplies the computation;
//! the cache decides whether to return a stored copy. Numeric code never
//! looks at the filesystem to decide whether it needs to run.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array2;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::errors::{Result, VersemapError};

/// SHA-256 key naming one cached value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Start a key in `namespace` (e.g. `"neighbors"`).
    pub fn builder(namespace: &str) -> CacheKeyBuilder {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update([0u8]);
        CacheKeyBuilder {
            namespace: namespace.to_string(),
            hasher,
        }
    }

    /// Key as a file-name-safe string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental key construction over an input's provenance.
pub struct CacheKeyBuilder {
    namespace: String,
    hasher: Sha256,
}

impl fmt::Debug for CacheKeyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheKeyBuilder")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl CacheKeyBuilder {
    /// Mix in a matrix's shape and element bytes in logical order.
    pub fn matrix(mut self, m: &Array2<f32>) -> Self {
        self.hasher.update((m.nrows() as u64).to_le_bytes());
        self.hasher.update((m.ncols() as u64).to_le_bytes());
        for x in m.iter() {
            self.hasher.update(x.to_le_bytes());
        }
        self
    }

    /// Mix in a named parameter.
    pub fn param(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b"=");
        self.hasher.update(value.to_string().as_bytes());
        self.hasher.update([0u8]);
        self
    }

    /// Finish as `namespace-<hex digest>`.
    pub fn finish(self) -> CacheKey {
        CacheKey(format!("{}-{}", self.namespace, hex::encode(self.hasher.finalize())))
    }
}

/// A value that can live in a [`DirCache`].
pub trait CacheValue: Sized + Clone + Send + Sync + 'static {
    /// File extension for the stored form.
    const EXT: &'static str;

    /// Read a stored value.
    fn read_from(path: &Path) -> Result<Self>;

    /// Store the value.
    fn write_to(&self, path: &Path) -> Result<()>;
}

impl CacheValue for Array2<f32> {
    const EXT: &'static str = "npy";

    fn read_from(path: &Path) -> Result<Self> {
        Ok(Array2::<f32>::read_npy(BufReader::new(File::open(path)?))?)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        self.write_npy(BufWriter::new(File::create(path)?))?;
        Ok(())
    }
}

impl<T> CacheValue for Vec<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    const EXT: &'static str = "json";

    fn read_from(path: &Path) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        serde_json::to_writer(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }
}

/// Get-or-compute memoisation.
pub trait ArtifactCache {
    /// Return the value stored under `key`, or run `compute`, store its
    /// result and return it. A failed computation stores nothing.
    fn get_or_compute<V, F>(&self, key: &CacheKey, compute: F) -> Result<V>
    where
        V: CacheValue,
        F: FnOnce() -> Result<V>;
}

/// Cache entries as files `<key>.<ext>` under one directory.
#[derive(Debug, Clone)]
pub struct DirCache {
    root: PathBuf,
}

impl DirCache {
    /// Cache rooted at `root` (created on first store).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path<V: CacheValue>(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.{}", key.as_str(), V::EXT))
    }
}

impl ArtifactCache for DirCache {
    fn get_or_compute<V, F>(&self, key: &CacheKey, compute: F) -> Result<V>
    where
        V: CacheValue,
        F: FnOnce() -> Result<V>,
    {
        let path = self.entry_path::<V>(key);
        if path.exists() {
            match V::read_from(&path) {
                Ok(v) => {
                    info!("cache hit: {}", path.display());
                    return Ok(v);
                }
                Err(e) => warn!("unreadable cache entry {}, recomputing: {}", path.display(), e),
            }
        }

        let value = compute()?;

        fs::create_dir_all(&self.root)?;
        // Write beside the entry then rename so readers never see a partial file.
        let tmp = self.root.join(format!("{}.{}.tmp", key.as_str(), V::EXT));
        let stored = value
            .write_to(&tmp)
            .and_then(|()| fs::rename(&tmp, &path).map_err(VersemapError::from));
        if let Err(e) = stored {
            if tmp.exists() {
                if let Err(rm) = fs::remove_file(&tmp) {
                    warn!("could not remove {}: {}", tmp.display(), rm);
                }
            }
            return Err(e);
        }
        debug!("cached {}", path.display());

        Ok(value)
    }
}

/// In-process cache, mostly for tests.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Box<dyn Any + Send + Sync>>>,
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache").field("len", &self.len()).finish()
    }
}

impl MemoryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactCache for MemoryCache {
    fn get_or_compute<V, F>(&self, key: &CacheKey, compute: F) -> Result<V>
    where
        V: CacheValue,
        F: FnOnce() -> Result<V>,
    {
        {
            let entries = self
                .entries
                .lock()
                .map_err(|_| VersemapError::Config("memory cache lock poisoned".into()))?;
            if let Some(v) = entries.get(key).and_then(|b| b.downcast_ref::<V>()) {
                return Ok(v.clone());
            }
        }

        let value = compute()?;
        self.entries
            .lock()
            .map_err(|_| VersemapError::Config("memory cache lock poisoned".into()))?
            .insert(key.clone(), Box::new(value.clone()));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Neighbor;
    use ndarray::array;
    use std::cell::Cell;

    fn key_for(m: &Array2<f32>, k: usize) -> CacheKey {
        CacheKey::builder("neighbors").matrix(m).param("k", k).finish()
    }

    #[test]
    fn test_key_depends_on_content_shape_and_params() {
        let a = array![[1.0f32, 2.0], [3.0, 4.0]];
        let b = array![[1.0f32, 2.0], [3.0, 4.5]];
        let c = array![[1.0f32, 2.0, 3.0, 4.0]];

        assert_eq!(key_for(&a, 8), key_for(&a.clone(), 8));
        assert_ne!(key_for(&a, 8), key_for(&b, 8));
        assert_ne!(key_for(&a, 8), key_for(&c, 8));
        assert_ne!(key_for(&a, 8), key_for(&a, 4));
        assert!(key_for(&a, 8).as_str().starts_with("neighbors-"));
        assert_eq!(key_for(&a, 8).as_str().len(), "neighbors-".len() + 64);
    }

    #[test]
    fn test_key_digest_is_lowercase_hex() {
        let key = key_for(&array![[0.5f32, -0.5]], 3);
        let digest = &key.as_str()["neighbors-".len()..];
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(hex::decode(digest).unwrap().len(), 32);
    }

    #[test]
    fn test_memory_cache_hit_skips_compute() {
        let cache = MemoryCache::new();
        let key = CacheKey::builder("t").param("x", 1).finish();
        let calls = Cell::new(0);

        let compute = || {
            calls.set(calls.get() + 1);
            Ok(vec![Neighbor(1, 0.5)])
        };
        let first: Vec<Neighbor> = cache.get_or_compute(&key, compute).unwrap();
        let second: Vec<Neighbor> = cache
            .get_or_compute(&key, || {
                calls.set(calls.get() + 1);
                Ok(vec![Neighbor(9, 0.0)])
            })
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_compute_stores_nothing() {
        let cache = MemoryCache::new();
        let key = CacheKey::builder("t").finish();
        let r: Result<Vec<u32>> =
            cache.get_or_compute(&key, || Err(VersemapError::InvalidArgument("boom".into())));
        assert!(r.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_dir_cache_roundtrip_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DirCache::new(dir.path().join("cache"));
        let key = CacheKey::builder("m").param("n", 2).finish();
        let m = array![[0.25f32, -1.0], [3.5, 0.0]];

        let stored: Array2<f32> = cache.get_or_compute(&key, || Ok(m.clone())).unwrap();
        let again: Array2<f32> = cache
            .get_or_compute(&key, || Err(VersemapError::InvalidArgument("recomputed".into())))
            .unwrap();

        assert_eq!(stored, m);
        assert_eq!(again, m);
        assert!(cache.root().join(format!("{}.npy", key)).exists());
    }

    #[test]
    fn test_dir_cache_failed_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DirCache::new(dir.path());
        let key = CacheKey::builder("n").finish();
        // A non-empty directory where the entry belongs: reading fails, and so does the rename.
        let entry = dir.path().join(format!("{}.json", key));
        fs::create_dir(&entry).unwrap();
        fs::write(entry.join("keep"), b"x").unwrap();

        let r: Result<Vec<u32>> = cache.get_or_compute(&key, || Ok(vec![1, 2, 3]));

        assert!(r.is_err());
        assert!(!dir.path().join(format!("{}.json.tmp", key)).exists());
        assert!(entry.join("keep").exists());
    }

    #[test]
    fn test_dir_cache_unreadable_entry_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DirCache::new(dir.path());
        let key = CacheKey::builder("n").finish();
        fs::write(dir.path().join(format!("{}.json", key)), b"{not json").unwrap();

        let v: Vec<Vec<Neighbor>> = cache
            .get_or_compute(&key, || Ok(vec![vec![Neighbor(2, 0.9)]]))
            .unwrap();
        assert_eq!(v, vec![vec![Neighbor(2, 0.9)]]);

        let back: Vec<Vec<Neighbor>> = cache
            .get_or_compute(&key, || Err(VersemapError::InvalidArgument("miss".into())))
            .unwrap();
        assert_eq!(back, v);
    }
}
