// SPDX-License-Identifier: GPL-3.0-only

//! Suzuki-Abe border following over a binary image
//!
//! The binary image is copied into a zero-padded `i32` label buffer so the
//! tracer never has to bounds-check. Visited border pixels are relabelled
//! with the (possibly negated) border number while tracing.

use image::GrayImage;
use nalgebra::Point2;

pub type Point2i = Point2<i32>;

/// Neighbour offsets (dx, dy), counter-clockwise starting east
const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One traced border
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point2i>,
    /// True for the inner border of a hole, false for an outer border
    pub hole: bool,
}

/// Label buffer with a one-pixel zero frame around the image
struct Labels {
    data: Vec<i32>,
    /// Index offsets of the 8 neighbours, repeated twice so the tracer can
    /// walk past index 7 without wrapping
    deltas: [isize; 16],
}

impl Labels {
    fn from_binary(binary: &GrayImage) -> Self {
        let (w, h) = (binary.width() as usize, binary.height() as usize);
        let stride = w + 2;
        let mut data = vec![0i32; stride * (h + 2)];
        for (y, row) in binary.as_raw().chunks_exact(w.max(1)).take(h).enumerate() {
            let start = (y + 1) * stride + 1;
            for (dst, &src) in data[start..start + w].iter_mut().zip(row) {
                *dst = i32::from(src != 0);
            }
        }

        let mut deltas = [0isize; 16];
        for (i, &(dx, dy)) in NEIGHBOURS.iter().enumerate() {
            let delta = dx as isize + dy as isize * stride as isize;
            deltas[i] = delta;
            deltas[i + 8] = delta;
        }

        Self { data, deltas }
    }

    #[inline]
    fn at(&self, pos: usize, dir: usize) -> usize {
        (pos as isize + self.deltas[dir]) as usize
    }

    /// Follow one border starting at `pos`, labelling it with `nbd`
    fn follow(&mut self, pos: usize, nbd: i32, start: Point2i, hole: bool) -> Contour {
        let mut points = Vec::new();
        let mut point = start;

        // Search clockwise for the first non-zero neighbour, starting from the
        // west (outer border) or east (hole) neighbour
        let mut dir: usize = if hole { 0 } else { 4 };
        let search_end = dir;
        let mut first;
        loop {
            dir = dir.wrapping_sub(1) & 7;
            first = self.at(pos, dir);
            if self.data[first] != 0 || dir == search_end {
                break;
            }
        }

        if self.data[first] == 0 {
            // Isolated pixel
            self.data[pos] = -nbd;
            points.push(point);
            return Contour { points, hole };
        }

        let mut current = pos;
        loop {
            let came_from = dir;
            let mut next;
            loop {
                dir = (dir + 1) & 15;
                next = self.at(current, dir);
                if self.data[next] != 0 {
                    break;
                }
            }
            dir &= 7;

            // The east neighbour was examined and found empty: right border pixel
            if (dir.wrapping_sub(1) as u32) < came_from as u32 {
                self.data[current] = -nbd;
            } else if self.data[current] == 1 {
                self.data[current] = nbd;
            }

            points.push(point);
            point.x += NEIGHBOURS[dir].0;
            point.y += NEIGHBOURS[dir].1;

            if next == pos && current == first {
                break;
            }
            current = next;
            dir = (dir + 4) & 7;
        }

        Contour { points, hole }
    }
}

/// Trace every outer and hole border of the non-zero pixels in `binary`
pub fn find_contours(binary: &GrayImage) -> Vec<Contour> {
    let (width, height) = (binary.width() as usize, binary.height() as usize);
    let mut labels = Labels::from_binary(binary);
    let mut contours = Vec::new();

    let mut nbd = 1;
    let mut pos = width + 3;
    for y in 0..height {
        for x in 0..width {
            let pixel = labels.data[pos];
            if pixel != 0 {
                let outer = pixel == 1 && labels.data[pos - 1] == 0;
                let hole = !outer && pixel >= 1 && labels.data[pos + 1] == 0;
                if outer || hole {
                    nbd += 1;
                    let start = Point2i::new(x as i32, y as i32);
                    contours.push(labels.follow(pos, nbd, start, hole));
                }
            }
            pos += 1;
        }
        pos += 2;
    }

    contours
}
