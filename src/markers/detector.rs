// SPDX-License-Identifier: GPL-3.0-only

//! ArUco marker detection
//!
//! Grayscale -> adaptive threshold -> border following -> quad candidates ->
//! perspective warp -> bit decoding. Corner refinement is not performed; the
//! corners are contour pixel positions.

use super::contours::{Contour, find_contours};
use super::cv;
use super::dictionary::{self, BitGrid, DictionaryMatch, GRID_SIZE, MARKER_CELLS};
use super::geometry;
use super::types::{MarkerObservation, Point2f};
use crate::config::DetectorConfig;
use crate::constants::detector as defaults;
use crate::frame::Frame;
use image::GrayImage;
use std::time::Instant;
use tracing::trace;

/// Finds fiducial markers in a color frame
pub trait MarkerDetector {
    /// Markers visible in `frame`, in detection order
    fn detect(&mut self, frame: &Frame) -> Vec<MarkerObservation>;
}

/// Detector for the original 5x5 ArUco dictionary
#[derive(Debug, Clone)]
pub struct ArucoDetector {
    config: DetectorConfig,
}

impl Default for ArucoDetector {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

impl MarkerDetector for ArucoDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<MarkerObservation> {
        self.detect_markers(frame)
    }
}

impl ArucoDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Run the full detection pipeline over one frame
    pub fn detect_markers(&self, frame: &Frame) -> Vec<MarkerObservation> {
        if frame.width() == 0 || frame.height() == 0 {
            return Vec::new();
        }
        let start = Instant::now();

        let gray = cv::grayscale(frame);
        let binary = cv::adaptive_threshold(
            &gray,
            self.config.adaptive_threshold_radius,
            self.config.adaptive_threshold_constant,
        );
        let threshold_time = start.elapsed();

        let contours = find_contours(&binary);
        let contour_time = start.elapsed() - threshold_time;

        let candidates = self.find_candidates(&contours, frame.width(), frame.height());
        let candidate_count = candidates.len();

        // Only decoded markers may suppress each other; the outline of a
        // marker's white quiet zone must not hide the marker inside it
        let decoded: Vec<MarkerObservation> = candidates
            .into_iter()
            .filter_map(|quad| self.decode_candidate(&gray, quad))
            .collect();
        let floor = frame.width() as f32 * defaults::MIN_CANDIDATE_DISTANCE_FRACTION;
        let min_distance = defaults::MIN_CANDIDATE_DISTANCE.max(floor);
        let markers = drop_near_duplicates(decoded, min_distance);

        trace!(
            contours = contours.len(),
            candidates = candidate_count,
            markers = markers.len(),
            threshold_ms = threshold_time.as_millis(),
            contour_ms = contour_time.as_millis(),
            total_ms = start.elapsed().as_millis(),
            "Marker detection stages"
        );

        markers
    }

    /// Convex quads large enough to hold a marker, corners clockwise
    fn find_candidates(&self, contours: &[Contour], width: u32, height: u32) -> Vec<[Point2f; 4]> {
        let min_points = (width.max(height) as f32 * self.config.min_contour_fraction) as usize;
        let min_edge = self.config.min_edge_length as f64;

        contours
            .iter()
            .filter(|c| c.points.len() >= min_points.max(4))
            .filter_map(|c| {
                let epsilon = c.points.len() as f64 * defaults::POLY_EPSILON_FRACTION;
                let polygon = geometry::approx_polygon(&c.points, epsilon);
                if polygon.len() != 4
                    || !geometry::is_convex(&polygon)
                    || geometry::min_edge_length(&polygon) < min_edge
                {
                    return None;
                }
                let mut quad = [Point2f::origin(); 4];
                for (corner, p) in quad.iter_mut().zip(&polygon) {
                    *corner = Point2f::new(p.x as f32, p.y as f32);
                }
                geometry::make_clockwise(&mut quad);
                Some(quad)
            })
            .collect()
    }

    /// Warp a candidate, read its bits and match them in all four rotations
    fn decode_candidate(&self, gray: &GrayImage, quad: [Point2f; 4]) -> Option<MarkerObservation> {
        let cell = defaults::WARP_CELL_SIZE;
        let patch = cv::warp_quad(gray, &quad, MARKER_CELLS * cell)?;
        let cells = read_cells(&patch, cell)?;

        let mut grid: BitGrid = [[false; GRID_SIZE]; GRID_SIZE];
        for (r, row) in grid.iter_mut().enumerate() {
            row.copy_from_slice(&cells[r + 1][1..=GRID_SIZE]);
        }

        let mut corners = quad;
        let mut best: Option<(DictionaryMatch, [Point2f; 4])> = None;
        for _ in 0..4 {
            let candidate = dictionary::decode(&grid);
            if best.is_none_or(|(b, _)| candidate.distance < b.distance) {
                best = Some((candidate, corners));
            }
            if candidate.distance == 0 {
                break;
            }
            // Rotating the bits clockwise moves the printed top-left onto the
            // corner that precedes the current first one
            grid = dictionary::rotate_clockwise(&grid);
            corners = [corners[3], corners[0], corners[1], corners[2]];
        }

        let (matched, corners) = best?;
        (matched.distance <= self.config.max_hamming_distance)
            .then(|| MarkerObservation::new(matched.id, corners))
    }

    /// Render `count` printable markers, ids starting at 1
    pub fn render_printable_markers(&self, count: u32, side: u32) -> Vec<Frame> {
        (1..=count.min(dictionary::MARKER_COUNT - 1))
            .filter_map(|id| super::printable::render_marker(id, side))
            .collect()
    }
}

/// Binarize a warped patch with Otsu and read its cells
///
/// Returns None unless every border cell is black.
fn read_cells(patch: &GrayImage, cell: usize) -> Option<[[bool; MARKER_CELLS]; MARKER_CELLS]> {
    let level = cv::otsu_level(patch.as_raw());
    let half = cell * cell / 2;

    let mut cells = [[false; MARKER_CELLS]; MARKER_CELLS];
    for (r, row) in cells.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            let mut white = 0;
            for y in r * cell..(r + 1) * cell {
                for x in c * cell..(c + 1) * cell {
                    if patch.get_pixel(x as u32, y as u32)[0] > level {
                        white += 1;
                    }
                }
            }
            *value = white > half;
        }
    }

    let last = MARKER_CELLS - 1;
    let border_black = (0..MARKER_CELLS)
        .all(|i| !cells[0][i] && !cells[last][i] && !cells[i][0] && !cells[i][last]);
    border_black.then_some(cells)
}

/// Among markers closer than `min_distance` (mean corner distance), keep the
/// one with the larger perimeter
fn drop_near_duplicates(
    markers: Vec<MarkerObservation>,
    min_distance: f32,
) -> Vec<MarkerObservation> {
    let limit = min_distance * min_distance;
    let mut dropped = vec![false; markers.len()];
    for i in 0..markers.len() {
        for j in i + 1..markers.len() {
            let (a, b) = (&markers[i].corners, &markers[j].corners);
            if geometry::mean_corner_distance_sq(a, b) < limit {
                if geometry::perimeter(a) < geometry::perimeter(b) {
                    dropped[i] = true;
                } else {
                    dropped[j] = true;
                }
            }
        }
    }
    markers
        .into_iter()
        .zip(dropped)
        .filter_map(|(m, d)| (!d).then_some(m))
        .collect()
}
