//! Copy finished artifacts into the site's data directory.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::{files, DataDir, Stage};
use crate::persistence::stage_artifacts;

/// Copies [`files::SITE_ARTIFACTS`] into `site_dir`.
#[derive(Debug, Clone)]
pub struct SiteStage {
    site_dir: PathBuf,
}

impl SiteStage {
    /// Stage targeting `site_dir`.
    pub fn new(site_dir: impl Into<PathBuf>) -> Self {
        Self {
            site_dir: site_dir.into(),
        }
    }
}

impl Stage for SiteStage {
    fn name(&self) -> &'static str {
        "stage"
    }

    fn run(&self, data: &DataDir) -> Result<()> {
        let report = stage_artifacts(data.root(), &self.site_dir, files::SITE_ARTIFACTS)?;
        info!(
            "staged {} artifacts ({} missing)",
            report.copied.len(),
            report.missing.len()
        );
        Ok(())
    }
}
