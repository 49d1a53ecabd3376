// SPDX-License-Identifier: MPL-2.0

//! Temporal averaging of depth frames
//!
//! Colorized depth flickers from frame to frame even when the scene is
//! static. The filter keeps the last N frames and emits their pixel-wise mean.

use crate::errors::FilterError;
use crate::frame::Frame;
use std::collections::VecDeque;
use tracing::trace;

/// Fixed-capacity FIFO of frames
///
/// The backing deque is allocated once; pushing past capacity evicts the
/// oldest frame.
#[derive(Debug, Clone)]
pub struct FrameWindow {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameWindow {
    /// Create an empty window; a capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest one first when full
    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Sliding-window mean over the last N depth frames
#[derive(Debug, Clone)]
pub struct AveragingFilter {
    window: FrameWindow,
}

impl Default for AveragingFilter {
    fn default() -> Self {
        Self::new(crate::constants::filters::AVERAGE_WINDOW_SIZE)
    }
}

impl AveragingFilter {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: FrameWindow::new(window_size),
        }
    }

    /// Add a frame to the window, evicting the oldest when at capacity
    pub fn add_frame(&mut self, frame: Frame) {
        self.window.push(frame);
    }

    /// Pixel-wise mean of every frame currently in the window
    ///
    /// Values are summed as `f64`, divided by the frame count and rounded half
    /// away from zero. The window is left untouched.
    ///
    /// # Errors
    ///
    /// [`FilterError::EmptyWindow`] when no frame was added yet, and
    /// [`FilterError::ShapeMismatch`] when the window holds frames of different
    /// shapes.
    pub fn get_average(&self) -> Result<Frame, FilterError> {
        let first = self.window.iter().next().ok_or(FilterError::EmptyWindow)?;
        let shape = first.shape();

        if let Some(mismatch) = self.window.iter().find(|f| f.shape() != shape) {
            return Err(FilterError::ShapeMismatch {
                expected: shape,
                found: mismatch.shape(),
            });
        }

        if self.window.len() == 1 {
            return Ok(first.clone());
        }

        let mut sums = vec![0f64; shape.byte_len()];
        for frame in self.window.iter() {
            for (sum, &value) in sums.iter_mut().zip(frame.data()) {
                *sum += value as f64;
            }
        }

        let count = self.window.len() as f64;
        let mut averaged = first.clone();
        for (out, sum) in averaged.data_mut().iter_mut().zip(sums) {
            *out = (sum / count).round().clamp(0.0, 255.0) as u8;
        }

        trace!(frames = self.window.len(), %shape, "Averaged depth window");
        Ok(averaged)
    }

    /// Frames currently in the window, oldest first
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Drop every buffered frame
    pub fn clear(&mut self) {
        self.window.clear();
    }
}
