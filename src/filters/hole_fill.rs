// SPDX-License-Identifier: MPL-2.0

//! Hole filling for colorized depth frames
//!
//! Depth sensors report "no reading" for some pixels every frame, and the set
//! of such pixels jumps around. A hole (all channels zero) is patched with the
//! co-located pixel of the previous output, so the last valid value carries
//! forward until the sensor reports the pixel again.

use crate::frame::{Frame, is_hole};
use tracing::{trace, warn};

#[derive(Debug, Clone, Default)]
pub struct HoleFillFilter {
    last_frame: Option<Frame>,
}

impl HoleFillFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch holes in `frame` from the previous output and return it
    ///
    /// The first frame, and any frame whose shape differs from the previous
    /// one, passes through unchanged and becomes the new reference.
    pub fn process(&mut self, mut frame: Frame) -> Frame {
        let Some(last) = self.last_frame.as_ref() else {
            self.last_frame = Some(frame.clone());
            return frame;
        };

        if !last.is_shape_compatible(&frame) {
            warn!(
                previous = %last.shape(),
                current = %frame.shape(),
                "Depth frame shape changed, restarting hole fill"
            );
            self.last_frame = Some(frame.clone());
            return frame;
        }

        let channels = frame.channels() as usize;
        let mut filled = 0usize;
        for (pixel, previous) in frame
            .data_mut()
            .chunks_exact_mut(channels)
            .zip(last.data().chunks_exact(channels))
        {
            if is_hole(pixel) {
                pixel.copy_from_slice(previous);
                filled += 1;
            }
        }
        trace!(filled, "Filled depth holes");

        self.last_frame = Some(frame.clone());
        frame
    }

    /// Forget the previous frame; the next call bootstraps again
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    pub fn has_history(&self) -> bool {
        self.last_frame.is_some()
    }
}
