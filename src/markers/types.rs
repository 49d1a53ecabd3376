// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for marker detection and tracking

use std::time::Instant;

/// Sub-pixel image coordinate (x right, y down)
pub type Point2f = nalgebra::Point2<f32>;

/// One detected marker
///
/// Corners run clockwise in image coordinates, starting at the marker's
/// top-left corner as printed.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerObservation {
    pub id: u32,
    pub corners: [Point2f; 4],
}

impl MarkerObservation {
    pub fn new(id: u32, corners: [Point2f; 4]) -> Self {
        Self { id, corners }
    }

    /// Mean of the four corners
    pub fn center(&self) -> Point2f {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0f32, 0.0f32), |(x, y), p| (x + p.x, y + p.y));
        Point2f::new(sx / 4.0, sy / 4.0)
    }

    /// First corner truncated to integer pixels, negatives clamped to 0
    pub fn anchor_pixel(&self) -> (u32, u32) {
        let p = self.corners[0];
        // `as` saturates: negatives and NaN become 0
        (p.x as u32, p.y as u32)
    }
}

/// Markers found by one detection pass and when it happened
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Markers in the order the detector reported them
    pub markers: Vec<MarkerObservation>,
    pub detected_at: Instant,
}

impl DetectionResult {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// First marker with the given id, if detected
    pub fn find(&self, id: u32) -> Option<&MarkerObservation> {
        self.markers.iter().find(|m| m.id == id)
    }
}
