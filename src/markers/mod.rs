// SPDX-License-Identifier: GPL-3.0-only

//! Fiducial marker detection and tracking
//!
//! - [`ArucoDetector`]: finds markers of the 5x5 ArUco dictionary in a frame
//! - [`MarkerTracker`]: throttles detection and derives crop regions and overlays
//! - [`printable`]: renders markers for printing

pub mod contours;
pub mod cv;
pub mod detector;
pub mod dictionary;
pub mod geometry;
pub mod overlay;
pub mod printable;
pub mod tracker;
pub mod types;

pub use detector::{ArucoDetector, MarkerDetector};
pub use tracker::{Clock, ManualClock, MarkerTracker, MonotonicClock, TrackerState};
pub use types::{DetectionResult, MarkerObservation, Point2f};
