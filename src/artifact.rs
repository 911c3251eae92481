//! Annotated detection images on disk.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::detect::Detection;
use crate::frame::Frame;

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `detections` onto a copy of `frame` and write it as
    /// `detection_<YYYYMMDD_HHMMSS>.jpg`. A second save within the same
    /// second overwrites the first.
    pub fn save_annotated(
        &self,
        frame: &Frame,
        detections: &[Detection],
        at: DateTime<Local>,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create detections dir {}", self.dir.display()))?;
        let path = self.dir.join(file_name(at));
        let image = frame.annotated(detections)?;
        image
            .save(&path)
            .with_context(|| format!("write detection image {}", path.display()))?;
        log::info!("Detection image saved: {}", path.display());
        Ok(path)
    }
}

fn file_name(at: DateTime<Local>) -> String {
    format!("detection_{}.jpg", at.format("%Y%m%d_%H%M%S"))
}
