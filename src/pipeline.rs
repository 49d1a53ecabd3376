// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame driving loop: depth filtering plus marker crop/overlay

use crate::config::{Config, OutputMode};
use crate::errors::FilterError;
use crate::filters::{AveragingFilter, HoleFillFilter};
use crate::frame::Frame;
use crate::markers::{ArucoDetector, Clock, MarkerDetector, MarkerTracker, MonotonicClock};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Output of one pipeline tick
#[derive(Debug, Clone)]
pub struct ProcessedFrames {
    pub color: Frame,
    pub depth: Frame,
    /// Whether marker detection ran during this tick
    pub redetected: bool,
}

/// Owns every stateful filter and runs them once per incoming frame pair
pub struct FramePipeline<D = ArucoDetector, C = MonotonicClock> {
    averaging: AveragingFilter,
    hole_fill: HoleFillFilter,
    tracker: MarkerTracker<D, C>,
    mode: OutputMode,
    frame_budget: Duration,
}

impl FramePipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_tracker(config, MarkerTracker::new(config))
    }
}

impl<D: MarkerDetector, C: Clock> FramePipeline<D, C> {
    pub fn with_tracker(config: &Config, tracker: MarkerTracker<D, C>) -> Self {
        Self {
            averaging: AveragingFilter::new(config.average_window_size),
            hole_fill: HoleFillFilter::new(),
            tracker,
            mode: config.output_mode,
            frame_budget: config.frame_interval(),
        }
    }

    /// Process one color/depth pair
    ///
    /// Depth goes through averaging and hole filling. Markers are re-detected
    /// on the color frame when due, then both frames are cropped to the
    /// markers or the markers are drawn onto the color frame.
    pub fn process(&mut self, color: Frame, depth: Frame) -> Result<ProcessedFrames, FilterError> {
        let start = Instant::now();

        self.averaging.add_frame(depth);
        let averaged = self.averaging.get_average()?;
        let filled = self.hole_fill.process(averaged);
        let filter_time = start.elapsed();

        let redetected = self.tracker.should_redetect();
        if redetected {
            self.tracker.detect(&color);
        }

        let (color, depth) = match self.mode {
            OutputMode::Crop => self.tracker.crop_to_markers(color, filled),
            OutputMode::Overlay => (self.tracker.draw_overlay(color), filled),
        };

        let elapsed = start.elapsed();
        trace!(
            filter_ms = filter_time.as_millis(),
            total_ms = elapsed.as_millis(),
            redetected,
            "Pipeline tick"
        );
        if elapsed > self.frame_budget {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                budget_ms = self.frame_budget.as_millis(),
                redetected,
                "Frame processing exceeded frame budget"
            );
        }

        Ok(ProcessedFrames {
            color,
            depth,
            redetected,
        })
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn tracker(&self) -> &MarkerTracker<D, C> {
        &self.tracker
    }

    pub fn averaging(&self) -> &AveragingFilter {
        &self.averaging
    }

    /// Drop all filter history and keep the marker cache
    pub fn reset_filters(&mut self) {
        self.averaging.clear();
        self.hole_fill.reset();
    }
}
