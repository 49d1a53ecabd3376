// SPDX-License-Identifier: GPL-3.0-only

//! PNG output of processed frame pairs

use crate::errors::AppResult;
use crate::frame::Frame;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes each processed color/depth pair as one side-by-side PNG
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    resolution: (u32, u32),
    written: usize,
}

impl PngSink {
    /// Create the output directory if needed
    pub fn create(dir: &Path, resolution: (u32, u32)) -> AppResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            resolution,
            written: 0,
        })
    }

    /// Scale both frames to the output resolution and write them side by side
    ///
    /// Returns the path of the written file.
    pub fn write(&mut self, color: &Frame, depth: &Frame) -> AppResult<PathBuf> {
        let (width, height) = self.resolution;
        let left = color.to_rgb().resize_to(width, height);
        let right = depth.to_rgb().resize_to(width, height);
        let combined = left.hstack(&right)?;

        let path = self.dir.join(format!("frame_{:06}.png", self.written));
        combined.to_dynamic_image().save(&path)?;
        debug!(path = %path.display(), "Wrote output frame");

        self.written += 1;
        Ok(path)
    }

    /// Number of frames written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
