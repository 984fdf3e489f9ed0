//! Writing artifacts to the data directory and staging them for the site.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Serialize `value` as compact JSON at `path`, creating parent dirs.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    writer.flush()?;

    let size = fs::metadata(path)?.len();
    info!("wrote {} ({:.1} MB)", path.display(), size as f64 / 1e6);
    Ok(size)
}

/// What [`stage_artifacts`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Destination paths written.
    pub copied: Vec<PathBuf>,
    /// Source paths that did not exist.
    pub missing: Vec<PathBuf>,
}

/// Copy each named artifact from `data_dir` into `site_dir`.
///
/// Missing artifacts are logged and skipped.
pub fn stage_artifacts(data_dir: &Path, site_dir: &Path, names: &[&str]) -> Result<StageReport> {
    fs::create_dir_all(site_dir)
        .with_context(|| format!("Failed to create site dir {}", site_dir.display()))?;

    let mut report = StageReport::default();
    for name in names {
        let src = data_dir.join(name);
        let dst = site_dir.join(name);
        if src.exists() {
            fs::copy(&src, &dst).with_context(|| {
                format!("Failed to copy {} to {}", src.display(), dst.display())
            })?;
            info!("{} -> {}", src.display(), dst.display());
            report.copied.push(dst);
        } else {
            warn!("{} not found, skipping", src.display());
            report.missing.push(src);
        }
    }
    Ok(report)
}
