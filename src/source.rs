// SPDX-License-Identifier: GPL-3.0-only

//! Recorded color/depth frame pairs read from two image directories
//!
//! Files are paired by their position after sorting each directory by file
//! name, so `color/0001.png` goes with `depth/0001.png`.

use crate::constants::file_formats;
use crate::errors::{AppError, AppResult};
use crate::frame::Frame;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load an image file as an RGB frame
pub fn load_image_as_frame(path: &Path) -> AppResult<Frame> {
    let image =
        image::open(path).map_err(|e| AppError::Source(format!("{}: {}", path.display(), e)))?;
    Ok(Frame::from_rgb_image(image.to_rgb8()))
}

fn load_pair(color: &Path, depth: &Path) -> AppResult<(Frame, Frame)> {
    Ok((load_image_as_frame(color)?, load_image_as_frame(depth)?))
}

/// Supported image files in `dir`, sorted by file name
pub fn list_images(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| AppError::Source(format!("{}: {}", dir.display(), e)))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(file_formats::is_image_extension)
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Iterator over `(color, depth)` frame pairs
#[derive(Debug)]
pub struct ImageSequenceSource {
    pairs: Vec<(PathBuf, PathBuf)>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn open(color_dir: &Path, depth_dir: &Path) -> AppResult<Self> {
        let color = list_images(color_dir)?;
        let depth = list_images(depth_dir)?;

        if color.len() != depth.len() {
            warn!(
                color = color.len(),
                depth = depth.len(),
                "Color and depth frame counts differ, extra frames are ignored"
            );
        }

        let pairs: Vec<_> = color.into_iter().zip(depth).collect();
        info!(
            pairs = pairs.len(),
            color_dir = %color_dir.display(),
            depth_dir = %depth_dir.display(),
            "Opened image sequence"
        );
        Ok(Self { pairs, next: 0 })
    }

    /// Number of frame pairs in the sequence
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(PathBuf, PathBuf)] {
        &self.pairs
    }
}

impl Iterator for ImageSequenceSource {
    type Item = AppResult<(Frame, Frame)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (color_path, depth_path) = self.pairs.get(self.next)?;
        self.next += 1;
        debug!(
            index = self.next - 1,
            color = %color_path.display(),
            depth = %depth_path.display(),
            "Loading frame pair"
        );
        Some(load_pair(color_path, depth_path))
    }
}
