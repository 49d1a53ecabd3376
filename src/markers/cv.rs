// SPDX-License-Identifier: GPL-3.0-only

//! Pixel-level image operations used by the marker detector

use super::types::Point2f;
use crate::frame::Frame;
use image::GrayImage;
use nalgebra::{Matrix3, SMatrix, SVector};

/// Gray value marking a foreground pixel in binary images
pub const FOREGROUND: u8 = 255;

/// Luma of an RGB triple using BT.601 weights
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Convert any frame to an 8-bit grayscale image
///
/// Single-channel frames are copied as is; two-channel frames use their first
/// (luma) channel.
pub fn grayscale(frame: &Frame) -> GrayImage {
    let (width, height) = (frame.width(), frame.height());
    let channels = frame.channels() as usize;
    let data: Vec<u8> = match channels {
        1 => frame.data().to_vec(),
        2 => frame.data().chunks_exact(2).map(|p| p[0]).collect(),
        _ => frame
            .data()
            .chunks_exact(channels)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect(),
    };
    // Length is width * height by construction of Frame
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Binarize with a local mean threshold
///
/// A pixel becomes [`FOREGROUND`] when it is at least `constant` darker than
/// the mean of the `(2 * radius + 1)^2` box around it (clipped at the image
/// edges). Everything else becomes 0.
pub fn adaptive_threshold(gray: &GrayImage, radius: u32, constant: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    let src = gray.as_raw();

    // Integral image with a zero row and column in front
    let stride = w + 1;
    let mut integral = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += src[y * w + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let r = radius as usize;
    let threshold = constant as i32;
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let mean = (sum / count) as i32;
            if src[y * w + x] as i32 - mean <= -threshold {
                out[y * w + x] = FOREGROUND;
            }
        }
    }

    GrayImage::from_raw(width, height, out).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Otsu's threshold: the level maximizing between-class variance
///
/// Values strictly above the returned level belong to the bright class.
pub fn otsu_level(pixels: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &p in pixels {
        histogram[p as usize] += 1;
    }

    let total = pixels.len() as f64;
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &n)| level as f64 * n as f64)
        .sum();

    let mut level = 0u8;
    let mut best = 0.0;
    let mut weight_bg = 0.0;
    let mut sum_bg = 0.0;
    for (i, &n) in histogram.iter().enumerate() {
        weight_bg += n as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * n as f64;
        let diff = sum_bg / weight_bg - (sum_all - sum_bg) / weight_fg;
        let between = weight_bg * weight_fg * diff * diff;
        if between > best {
            best = between;
            level = i as u8;
        }
    }
    level
}

/// Homography taking the unit square (0,0) (1,0) (1,1) (0,1) onto `quad`
///
/// Returns None for degenerate quads.
pub fn unit_square_homography(quad: &[Point2f; 4]) -> Option<Matrix3<f64>> {
    const UNIT: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (i, (&(u, v), p)) in UNIT.iter().zip(quad).enumerate() {
        let (x, y) = (p.x as f64, p.y as f64);
        let r = 2 * i;
        a.row_mut(r)
            .copy_from_slice(&[u, v, 1.0, 0.0, 0.0, 0.0, -u * x, -v * x]);
        a.row_mut(r + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, u, v, 1.0, -u * y, -v * y]);
        b[r] = x;
        b[r + 1] = y;
    }

    let h = a.lu().solve(&b)?;
    let homography = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
    Some(homography)
}

/// Bilinear sample at a sub-pixel position, clamped to the image
fn sample_bilinear(gray: &GrayImage, x: f64, y: f64) -> u8 {
    let (width, height) = gray.dimensions();
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let px = |x, y| gray.get_pixel(x, y)[0] as f64;
    let top = px(x0, y0) * (1.0 - fx) + px(x1, y0) * fx;
    let bottom = px(x0, y1) * (1.0 - fx) + px(x1, y1) * fx;
    (top * (1.0 - fy) + bottom * fy).round() as u8
}

/// Sample the quadrilateral `quad` into a `size` x `size` square patch
///
/// Patch row 0 runs from `quad[0]` towards `quad[1]`.
pub fn warp_quad(gray: &GrayImage, quad: &[Point2f; 4], size: usize) -> Option<GrayImage> {
    if size == 0 || gray.width() == 0 || gray.height() == 0 {
        return None;
    }
    let homography = unit_square_homography(quad)?;

    let mut patch = GrayImage::new(size as u32, size as u32);
    let scale = size as f64;
    for (px, py, pixel) in patch.enumerate_pixels_mut() {
        let u = (px as f64 + 0.5) / scale;
        let v = (py as f64 + 0.5) / scale;
        let mapped = homography * nalgebra::Vector3::new(u, v, 1.0);
        if mapped.z.abs() < f64::EPSILON {
            return None;
        }
        pixel[0] = sample_bilinear(gray, mapped.x / mapped.z, mapped.y / mapped.z);
    }
    Some(patch)
}
