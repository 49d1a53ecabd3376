// SPDX-License-Identifier: GPL-3.0-only

//! Polygon helpers for turning contours into marker candidates

use super::contours::Point2i;
use super::types::Point2f;

/// Douglas-Peucker simplification of a closed contour
///
/// The contour is split at its first point and the point farthest from it;
/// each half is simplified independently. Returned vertices keep contour
/// order and start with `contour[0]`.
pub fn approx_polygon(contour: &[Point2i], epsilon: f64) -> Vec<Point2i> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let origin = contour[0];
    let (far, far_dist_sq) = contour
        .iter()
        .enumerate()
        .map(|(i, p)| (i, dist_sq(origin, *p)))
        .fold((0, 0.0), |best, cur| {
            if cur.1 > best.1 { cur } else { best }
        });

    if far_dist_sq <= epsilon * epsilon {
        return vec![origin];
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    // Chains are index ranges; index n stands for contour[0] again
    let mut stack = vec![(0usize, far), (far, n)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let a = contour[start % n];
        let b = contour[end % n];
        let (split, dist) = ((start + 1)..end)
            .map(|i| (i, line_distance(contour[i % n], a, b)))
            .fold((start, 0.0), |best, cur| {
                if cur.1 > best.1 { cur } else { best }
            });
        if dist > epsilon {
            keep[split % n] = true;
            stack.push((start, split));
            stack.push((split, end));
        }
    }

    contour
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn dist_sq(a: Point2i, b: Point2i) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx * dx + dy * dy
}

/// Distance from `p` to the line through `a` and `b`
fn line_distance(p: Point2i, a: Point2i, b: Point2i) -> f64 {
    let len = dist_sq(a, b).sqrt();
    if len == 0.0 {
        return dist_sq(a, p).sqrt();
    }
    let cross = (b.x - a.x) as f64 * (p.y - a.y) as f64 - (b.y - a.y) as f64 * (p.x - a.x) as f64;
    cross.abs() / len
}

/// True if every turn of the closed polygon has the same orientation
pub fn is_convex(polygon: &[Point2i]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i64;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let c = polygon[(i + 2) % n];
        let cross = (b.x - a.x) as i64 * (c.y - b.y) as i64
            - (b.y - a.y) as i64 * (c.x - b.x) as i64;
        if cross == 0 {
            continue;
        }
        if sign == 0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0
}

/// Length of the shortest edge of the closed polygon
pub fn min_edge_length(polygon: &[Point2i]) -> f64 {
    let n = polygon.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| dist_sq(polygon[i], polygon[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

/// Perimeter of a quad
pub fn perimeter(quad: &[Point2f; 4]) -> f32 {
    (0..4)
        .map(|i| nalgebra::distance(&quad[i], &quad[(i + 1) % 4]))
        .sum()
}

/// Reorder a quad so its corners run clockwise in image coordinates (y down)
///
/// Corner 0 stays in place.
pub fn make_clockwise(quad: &mut [Point2f; 4]) {
    let d1 = quad[1] - quad[0];
    let d2 = quad[2] - quad[0];
    if d1.x * d2.y - d1.y * d2.x < 0.0 {
        quad.swap(1, 3);
    }
}

/// Mean squared distance between corresponding corners, minimized over the
/// four cyclic alignments of `b`
pub fn mean_corner_distance_sq(a: &[Point2f; 4], b: &[Point2f; 4]) -> f32 {
    (0..4)
        .map(|shift| {
            (0..4)
                .map(|k| nalgebra::distance_squared(&a[k], &b[(k + shift) % 4]))
                .sum::<f32>()
                / 4.0
        })
        .fold(f32::INFINITY, f32::min)
}
