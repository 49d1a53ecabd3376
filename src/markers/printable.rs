// SPDX-License-Identifier: GPL-3.0-only

//! Marker images for printing

use super::dictionary::{self, MARKER_CELLS};
use crate::frame::Frame;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Render marker `id` as a `side` x `side` grayscale frame
///
/// The image is the bare 7x7 cell grid: black border, white cells for set
/// bits, no quiet zone. Returns None if `id` is outside the dictionary.
pub fn render_marker(id: u32, side: u32) -> Option<Frame> {
    let bits = dictionary::encode(id)?;
    let cells = MARKER_CELLS as u64;
    let n = side as u64;

    let cell_of = |px: u32| ((px as u64 * cells) / n.max(1)) as usize;
    let mut data = Vec::with_capacity((n * n) as usize);
    for y in 0..side {
        let row = cell_of(y);
        for x in 0..side {
            let col = cell_of(x);
            let interior =
                (1..MARKER_CELLS - 1).contains(&row) && (1..MARKER_CELLS - 1).contains(&col);
            let white = interior && bits[row - 1][col - 1];
            data.push(if white { WHITE } else { BLACK });
        }
    }

    Frame::new(side, side, 1, data).ok()
}

/// Surround a marker with a white margin of `fraction` times its side
pub fn with_quiet_zone(marker: &Frame, fraction: f32) -> Frame {
    let margin = (marker.width() as f32 * fraction.max(0.0)).round() as u32;
    let width = marker.width() + 2 * margin;
    let height = marker.height() + 2 * margin;
    let channels = marker.channels() as usize;

    let mut data = vec![WHITE; width as usize * height as usize * channels];
    let src_row = marker.width() as usize * channels;
    let dst_row = width as usize * channels;
    for (y, row) in marker.data().chunks_exact(src_row.max(1)).enumerate() {
        let start = (y + margin as usize) * dst_row + margin as usize * channels;
        data[start..start + src_row].copy_from_slice(row);
    }

    Frame::new(width, height, marker.channels(), data).unwrap_or_else(|_| marker.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_is_black() {
        let frame = render_marker(3, 70).unwrap();
        for i in 0..70 {
            assert_eq!(frame.pixel(i, 0), Some(&[BLACK][..]));
            assert_eq!(frame.pixel(0, i), Some(&[BLACK][..]));
            assert_eq!(frame.pixel(i, 69), Some(&[BLACK][..]));
            assert_eq!(frame.pixel(69, i), Some(&[BLACK][..]));
        }
    }

    #[test]
    fn test_cells_follow_bits() {
        // Cell size 10: data cell (row r, col c) is centred at (15 + 10c, 15 + 10r)
        let frame = render_marker(3, 70).unwrap();
        let bits = dictionary::encode(3).unwrap();
        for (r, row) in bits.iter().enumerate() {
            for (c, &bit) in row.iter().enumerate() {
                let px = frame.pixel(15 + 10 * c as u32, 15 + 10 * r as u32).unwrap()[0];
                assert_eq!(px == WHITE, bit, "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_out_of_range_id() {
        assert!(render_marker(dictionary::MARKER_COUNT, 100).is_none());
    }

    #[test]
    fn test_quiet_zone() {
        let marker = render_marker(1, 100).unwrap();
        let padded = with_quiet_zone(&marker, 0.25);
        assert_eq!(padded.width(), 150);
        assert_eq!(padded.pixel(10, 10), Some(&[WHITE][..]));
        assert_eq!(padded.pixel(25, 25), Some(&[BLACK][..]));
        assert_eq!(padded.pixel(124, 124), Some(&[BLACK][..]));
        assert_eq!(padded.pixel(125, 125), Some(&[WHITE][..]));
    }
}
