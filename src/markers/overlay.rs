// SPDX-License-Identifier: GPL-3.0-only

//! Debug drawing of detected markers onto a frame

use super::cv::luma;
use super::types::{MarkerObservation, Point2f};
use crate::frame::Frame;

pub const EDGE_COLOR: [u8; 3] = [0, 255, 0];
pub const CORNER_COLOR: [u8; 3] = [255, 0, 0];
pub const LABEL_COLOR: [u8; 3] = [0, 0, 255];

/// Half side of the square drawn over corner 0
const CORNER_HALF_SIZE: i64 = 2;

/// Pixel scale of the id label
const LABEL_SCALE: i64 = 2;

/// 3x5 digit glyphs, one row per entry, bit 2 = left column
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Draw outline, corner-0 square and id label for each marker
pub fn draw_markers(frame: &mut Frame, markers: &[MarkerObservation]) {
    for marker in markers {
        draw_marker(frame, marker);
    }
}

pub fn draw_marker(frame: &mut Frame, marker: &MarkerObservation) {
    for i in 0..4 {
        let (from, to) = (marker.corners[i], marker.corners[(i + 1) % 4]);
        draw_line(frame, from, to, EDGE_COLOR);
    }

    let (cx, cy) = rounded(marker.corners[0]);
    for y in cy - CORNER_HALF_SIZE..=cy + CORNER_HALF_SIZE {
        for x in cx - CORNER_HALF_SIZE..=cx + CORNER_HALF_SIZE {
            put_pixel(frame, x, y, CORNER_COLOR);
        }
    }

    let (x, y) = rounded(marker.center());
    draw_number(frame, marker.id, x, y);
}

fn rounded(p: Point2f) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

/// Bresenham line between two points
fn draw_line(frame: &mut Frame, from: Point2f, to: Point2f, color: [u8; 3]) {
    let (mut x0, mut y0) = rounded(from);
    let (x1, y1) = rounded(to);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(frame, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draw `value` in decimal, centred on (cx, cy)
fn draw_number(frame: &mut Frame, value: u32, cx: i64, cy: i64) {
    let digits: Vec<usize> = value
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();

    let glyph_w = 3 * LABEL_SCALE;
    let advance = glyph_w + LABEL_SCALE;
    let total_w = digits.len() as i64 * advance - LABEL_SCALE;
    let left = cx - total_w / 2;
    let top = cy - 5 * LABEL_SCALE / 2;

    for (n, &digit) in digits.iter().enumerate() {
        let origin_x = left + n as i64 * advance;
        for (row, bits) in DIGITS[digit].iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                let x = origin_x + col * LABEL_SCALE;
                let y = top + row as i64 * LABEL_SCALE;
                for dy in 0..LABEL_SCALE {
                    for dx in 0..LABEL_SCALE {
                        put_pixel(frame, x + dx, y + dy, LABEL_COLOR);
                    }
                }
            }
        }
    }
}

/// Write an RGB color, converting to the frame's channel layout; out of
/// bounds writes are ignored
fn put_pixel(frame: &mut Frame, x: i64, y: i64, color: [u8; 3]) {
    if x < 0 || y < 0 || x > u32::MAX as i64 || y > u32::MAX as i64 {
        return;
    }
    let Some(pixel) = frame.pixel_mut(x as u32, y as u32) else {
        return;
    };
    match pixel.len() {
        1 => pixel[0] = luma(color[0], color[1], color[2]),
        2 => {
            pixel[0] = luma(color[0], color[1], color[2]);
            pixel[1] = u8::MAX;
        }
        _ => {
            pixel[..3].copy_from_slice(&color);
            if let Some(alpha) = pixel.get_mut(3) {
                *alpha = u8::MAX;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_marker(id: u32) -> MarkerObservation {
        MarkerObservation::new(
            id,
            [
                Point2f::new(10.0, 10.0),
                Point2f::new(40.0, 10.0),
                Point2f::new(40.0, 40.0),
                Point2f::new(10.0, 40.0),
            ],
        )
    }

    #[test]
    fn test_draws_edges_corner_and_label() {
        let mut frame = Frame::filled(50, 50, &[0, 0, 0]).unwrap();
        draw_marker(&mut frame, &square_marker(7));

        // Edge pixel away from corner 0
        assert_eq!(frame.pixel(30, 40), Some(&EDGE_COLOR[..]));
        assert_eq!(frame.pixel(40, 25), Some(&EDGE_COLOR[..]));
        // Corner 0 is painted over the edges
        assert_eq!(frame.pixel(10, 10), Some(&CORNER_COLOR[..]));
        assert_eq!(frame.pixel(12, 12), Some(&CORNER_COLOR[..]));
        // Label near the centre
        let labelled = (20..30)
            .flat_map(|y| (20..30).map(move |x| (x, y)))
            .any(|(x, y)| frame.pixel(x, y) == Some(&LABEL_COLOR[..]));
        assert!(labelled);
        // Interior outside the label untouched
        assert_eq!(frame.pixel(15, 35), Some(&[0u8, 0, 0][..]));
    }

    #[test]
    fn test_gray_frames_receive_luma() {
        let mut frame = Frame::filled(50, 50, &[0]).unwrap();
        draw_marker(&mut frame, &square_marker(1));
        assert_eq!(frame.pixel(30, 40), Some(&[luma(0, 255, 0)][..]));
    }

    #[test]
    fn test_markers_outside_frame_are_clipped() {
        let mut frame = Frame::filled(20, 20, &[0, 0, 0]).unwrap();
        let marker = MarkerObservation::new(
            12,
            [
                Point2f::new(-30.0, -30.0),
                Point2f::new(100.0, -30.0),
                Point2f::new(100.0, 100.0),
                Point2f::new(-30.0, 100.0),
            ],
        );
        draw_marker(&mut frame, &marker);
    }
}
