// SPDX-License-Identifier: GPL-3.0-only

//! Throttled marker detection and marker-derived crop/overlay
//!
//! Detection is too slow to run on every frame. The tracker runs it at most
//! once per re-detection interval and serves overlay and crop requests from
//! the cached result in between.

use super::detector::{ArucoDetector, MarkerDetector};
use super::overlay;
use super::types::{DetectionResult, MarkerObservation};
use crate::config::{Config, CropMarkerSelection};
use crate::frame::{CropRegion, Frame};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

// ===== Clocks =====

/// Monotonic time source
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock advanced by hand, for replays and tests
///
/// Clones share the same time, so a test can keep a handle while the tracker
/// owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

// ===== Tracker =====

#[derive(Debug, Clone, Default)]
pub enum TrackerState {
    /// No detection has run yet
    #[default]
    Idle,
    /// Holds the most recent detection
    Cached(DetectionResult),
}

pub struct MarkerTracker<D = ArucoDetector, C = MonotonicClock> {
    detector: D,
    clock: C,
    redetect_interval: Duration,
    crop_marker_ids: [u32; 2],
    selection: CropMarkerSelection,
    state: TrackerState,
}

impl MarkerTracker {
    /// Tracker using the ArUco detector and the system monotonic clock
    pub fn new(config: &Config) -> Self {
        Self::with_parts(config, ArucoDetector::new(&config.detector), MonotonicClock)
    }
}

impl<D: MarkerDetector, C: Clock> MarkerTracker<D, C> {
    pub fn with_parts(config: &Config, detector: D, clock: C) -> Self {
        Self {
            detector,
            clock,
            redetect_interval: config.redetect_interval(),
            crop_marker_ids: config.crop_marker_ids,
            selection: config.crop_marker_selection,
            state: TrackerState::Idle,
        }
    }

    /// True if nothing was detected yet or the cache is older than the interval
    pub fn should_redetect(&self) -> bool {
        match &self.state {
            TrackerState::Idle => true,
            TrackerState::Cached(result) => {
                self.clock.now().saturating_duration_since(result.detected_at)
                    > self.redetect_interval
            }
        }
    }

    /// Run detection on `color` and replace the cache
    pub fn detect(&mut self, color: &Frame) {
        let start = Instant::now();
        let markers = self.detector.detect(color);
        debug!(
            markers = markers.len(),
            ids = ?markers.iter().map(|m| m.id).collect::<Vec<_>>(),
            elapsed_ms = start.elapsed().as_millis(),
            "Marker re-detection"
        );
        self.state = TrackerState::Cached(DetectionResult {
            markers,
            detected_at: self.clock.now(),
        });
    }

    /// Draw the cached markers onto `color`
    pub fn draw_overlay(&self, mut color: Frame) -> Frame {
        if let Some(result) = self.cached() {
            overlay::draw_markers(&mut color, &result.markers);
        }
        color
    }

    /// The two markers spanning the crop rectangle, if both are cached
    fn crop_markers(&self) -> Option<(&MarkerObservation, &MarkerObservation)> {
        let result = self.cached()?;
        match self.selection {
            CropMarkerSelection::DetectionOrder => match result.markers.as_slice() {
                [first, second, ..] => Some((first, second)),
                _ => None,
            },
            CropMarkerSelection::ConfiguredIds => {
                let [a, b] = self.crop_marker_ids;
                Some((result.find(a)?, result.find(b)?))
            }
        }
    }

    /// Region the next crop of a `width` x `height` frame would use
    ///
    /// Spanned by the first corners of the two crop markers and clipped to the
    /// frame. None if fewer than two markers are available or the region is
    /// empty.
    pub fn crop_region(&self, width: u32, height: u32) -> Option<CropRegion> {
        let (a, b) = self.crop_markers()?;
        let region = CropRegion::from_corners(a.anchor_pixel(), b.anchor_pixel())
            .clipped_to(width, height);
        if region.is_empty() {
            debug!(?region, "Crop region is empty, not cropping");
            return None;
        }
        Some(region)
    }

    /// Crop both frames to the marker rectangle, or return them unchanged
    ///
    /// Both frames are expected to share a resolution; the region is computed
    /// from the color frame.
    pub fn crop_to_markers(&self, color: Frame, depth: Frame) -> (Frame, Frame) {
        match self.crop_region(color.width(), color.height()) {
            Some(region) => (color.crop(&region), depth.crop(&region)),
            None => (color, depth),
        }
    }

    pub fn cached(&self) -> Option<&DetectionResult> {
        match &self.state {
            TrackerState::Idle => None,
            TrackerState::Cached(result) => Some(result),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }
}

impl<C: Clock> MarkerTracker<ArucoDetector, C> {
    /// Printable images of markers 1..=count at `side` pixels
    pub fn render_printable_markers(&self, count: u32, side: u32) -> Vec<Frame> {
        self.detector.render_printable_markers(count, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::types::Point2f;

    /// Detector returning a fixed list and counting calls
    struct FixedDetector {
        markers: Vec<MarkerObservation>,
        calls: Rc<Cell<usize>>,
    }

    impl MarkerDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Vec<MarkerObservation> {
            self.calls.set(self.calls.get() + 1);
            self.markers.clone()
        }
    }

    fn marker(id: u32, x: f32, y: f32) -> MarkerObservation {
        MarkerObservation::new(
            id,
            [
                Point2f::new(x, y),
                Point2f::new(x + 5.0, y),
                Point2f::new(x + 5.0, y + 5.0),
                Point2f::new(x, y + 5.0),
            ],
        )
    }

    type TestTracker = MarkerTracker<FixedDetector, ManualClock>;

    fn tracker(
        config: &Config,
        markers: Vec<MarkerObservation>,
    ) -> (TestTracker, ManualClock, Rc<Cell<usize>>) {
        let clock = ManualClock::new();
        let calls = Rc::new(Cell::new(0));
        let detector = FixedDetector {
            markers,
            calls: calls.clone(),
        };
        let tracker = MarkerTracker::with_parts(config, detector, clock.clone());
        (tracker, clock, calls)
    }

    #[test]
    fn test_redetect_schedule() {
        let (mut t, clock, calls) = tracker(&Config::default(), vec![]);
        assert!(t.should_redetect());
        assert!(matches!(t.state(), TrackerState::Idle));

        t.detect(&Frame::filled(4, 4, &[0, 0, 0]).unwrap());
        assert_eq!(calls.get(), 1);
        assert!(!t.should_redetect());

        clock.advance(Duration::from_secs(2));
        // Exactly the interval is not enough
        assert!(!t.should_redetect());
        clock.advance(Duration::from_millis(1));
        assert!(t.should_redetect());
    }

    #[test]
    fn test_configured_ids_selection() {
        let config = Config {
            crop_marker_selection: CropMarkerSelection::ConfiguredIds,
            crop_marker_ids: [1, 2],
            ..Config::default()
        };
        let (mut t, _, _) = tracker(
            &config,
            vec![
                marker(7, 0.0, 0.0),
                marker(2, 30.0, 40.0),
                marker(1, 10.0, 5.0),
            ],
        );
        t.detect(&Frame::filled(1, 1, &[0]).unwrap());
        assert_eq!(
            t.crop_region(100, 100),
            Some(CropRegion {
                min_x: 10,
                min_y: 5,
                max_x: 30,
                max_y: 40
            })
        );
    }

    #[test]
    fn test_configured_ids_missing_means_no_crop() {
        let config = Config {
            crop_marker_selection: CropMarkerSelection::ConfiguredIds,
            ..Config::default()
        };
        let (mut t, _, _) = tracker(&config, vec![marker(1, 0.0, 0.0), marker(9, 30.0, 40.0)]);
        t.detect(&Frame::filled(1, 1, &[0]).unwrap());
        assert_eq!(t.crop_region(100, 100), None);
    }

    #[test]
    fn test_degenerate_region_is_not_cropped() {
        let markers = vec![marker(1, 10.0, 5.0), marker(2, 10.0, 50.0)];
        let (mut t, _, _) = tracker(&Config::default(), markers);
        t.detect(&Frame::filled(1, 1, &[0]).unwrap());
        let color = Frame::filled(60, 60, &[1, 2, 3]).unwrap();
        let depth = Frame::filled(60, 60, &[4, 5, 6]).unwrap();
        let (c, d) = t.crop_to_markers(color.clone(), depth.clone());
        assert_eq!(c, color);
        assert_eq!(d, depth);
    }

    #[test]
    fn test_overlay_without_cache_is_identity() {
        let (t, _, _) = tracker(&Config::default(), vec![]);
        let frame = Frame::filled(8, 8, &[9, 9, 9]).unwrap();
        assert_eq!(t.draw_overlay(frame.clone()), frame);
    }
}
