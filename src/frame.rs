// SPDX-License-Identifier: MPL-2.0

//! Frame buffer shared by every filter stage
//!
//! Frames are dense, row-major grids of interleaved 8-bit channels. Color
//! frames and colorized depth frames use the same representation; colored
//! frames are stored in RGB(A) channel order.

use crate::errors::{FilterError, FrameError};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba};
use std::fmt;

/// Width, height and channel count of a frame
///
/// Two frames are shape-compatible iff their shapes are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameShape {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl FrameShape {
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Number of pixels (width * height)
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes a frame of this shape occupies
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * self.channels as usize
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Axis-aligned pixel rectangle, half-open on both axes
///
/// Covers columns `min_x..max_x` and rows `min_y..max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl CropRegion {
    /// Bounding box of two points, min/max taken independently per axis
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    /// True if the region covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Clip the region to a frame of the given dimensions
    pub fn clipped_to(&self, width: u32, height: u32) -> Self {
        Self {
            min_x: self.min_x.min(width),
            min_y: self.min_y.min(height),
            max_x: self.max_x.min(width),
            max_y: self.max_y.min(height),
        }
    }
}

/// A single image frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an interleaved buffer, validating its length against the shape
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, FrameError> {
        if !(1..=4).contains(&channels) {
            return Err(FrameError::UnsupportedChannels(channels));
        }

        let shape = FrameShape::new(width, height, channels);
        if data.len() != shape.byte_len() {
            return Err(FrameError::InvalidLayout {
                shape,
                expected_len: shape.byte_len(),
                actual_len: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Frame with every pixel set to `pixel`; the channel count is `pixel.len()`
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Result<Self, FrameError> {
        let channels =
            u8::try_from(pixel.len()).map_err(|_| FrameError::UnsupportedChannels(u8::MAX))?;
        let data = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, channels, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn shape(&self) -> FrameShape {
        FrameShape::new(self.width, self.height, self.channels)
    }

    /// Check that two frames share width, height and channel count
    pub fn is_shape_compatible(&self, other: &Frame) -> bool {
        self.shape() == other.shape()
    }

    pub fn pixel_count(&self) -> usize {
        self.shape().pixel_count()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Channel values of the pixel at (x, y), or None when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        let offset = self.offset(x, y)?;
        Some(&self.data[offset..offset + self.channels as usize])
    }

    /// Mutable channel values of the pixel at (x, y), or None when out of bounds
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let offset = self.offset(x, y)?;
        let channels = self.channels as usize;
        Some(&mut self.data[offset..offset + channels])
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.channels as usize)
    }

    /// Copy out the pixels inside `region`, clipped to the frame bounds
    pub fn crop(&self, region: &CropRegion) -> Frame {
        let region = region.clipped_to(self.width, self.height);
        let channels = self.channels as usize;
        let row_len = region.width() as usize * channels;
        let stride = self.width as usize * channels;

        let mut data = Vec::with_capacity(row_len * region.height() as usize);
        for y in region.min_y..region.max_y {
            let start = y as usize * stride + region.min_x as usize * channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }

        Frame {
            width: region.width(),
            height: region.height(),
            channels: self.channels,
            data,
        }
    }

    /// Place `right` to the right of `self`; heights and channel counts must match
    pub fn hstack(&self, right: &Frame) -> Result<Frame, FilterError> {
        if self.height != right.height || self.channels != right.channels {
            return Err(FilterError::ShapeMismatch {
                expected: FrameShape::new(right.width, self.height, self.channels),
                found: right.shape(),
            });
        }

        let channels = self.channels as usize;
        let left_row = self.width as usize * channels;
        let right_row = right.width as usize * channels;
        let mut data = Vec::with_capacity(self.data.len() + right.data.len());

        for y in 0..self.height as usize {
            data.extend_from_slice(&self.data[y * left_row..(y + 1) * left_row]);
            data.extend_from_slice(&right.data[y * right_row..(y + 1) * right_row]);
        }

        Ok(Frame {
            width: self.width + right.width,
            height: self.height,
            channels: self.channels,
            data,
        })
    }

    /// Resize with a triangle (bilinear) filter, keeping the channel count
    pub fn resize_to(&self, target_width: u32, target_height: u32) -> Frame {
        if target_width == self.width && target_height == self.height {
            return self.clone();
        }
        let resized = self.to_dynamic_image().resize_exact(
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );
        Frame::from_dynamic_image(resized)
    }

    // =========================================================================
    // image crate interop
    // =========================================================================

    /// Convert into an `image` buffer matching the channel count
    pub fn to_dynamic_image(&self) -> DynamicImage {
        let (w, h, data) = (self.width, self.height, self.data.clone());
        // Buffer length is validated in Frame::new, so from_raw cannot fail
        match self.channels {
            1 => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            _ => ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        }
        .unwrap_or_else(|| DynamicImage::new_rgb8(w, h))
    }

    /// Convert to 3-channel RGB, expanding gray and dropping alpha
    pub fn to_rgb(&self) -> Frame {
        if self.channels == 3 {
            return self.clone();
        }
        Frame::from_rgb_image(self.to_dynamic_image().to_rgb8())
    }

    /// Take ownership of an `image` buffer, keeping 8-bit layouts as they are
    pub fn from_dynamic_image(image: DynamicImage) -> Frame {
        let (width, height) = (image.width(), image.height());
        let (channels, data) = match image {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            // 16-bit and float images are narrowed to RGB8
            other => (3, other.to_rgb8().into_raw()),
        };
        Frame {
            width,
            height,
            channels,
            data,
        }
    }

    pub fn from_rgb_image(image: RgbImage) -> Frame {
        Frame::from_dynamic_image(DynamicImage::ImageRgb8(image))
    }

    pub fn from_gray_image(image: GrayImage) -> Frame {
        Frame::from_dynamic_image(DynamicImage::ImageLuma8(image))
    }
}

/// A pixel is a hole when every channel is zero (no depth reading)
#[inline]
pub fn is_hole(pixel: &[u8]) -> bool {
    pixel.iter().all(|&v| v == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(4, 2, 3, vec![7u8; 4 * 2 * 3]).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.pixel_count(), 8);
        assert_eq!(frame.pixel(3, 1), Some(&[7u8, 7, 7][..]));
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn test_frame_rejects_bad_layout() {
        let err = Frame::new(4, 2, 3, vec![0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidLayout {
                expected_len: 24,
                actual_len: 10,
                ..
            }
        ));
        assert_eq!(
            Frame::new(1, 1, 0, vec![]).unwrap_err(),
            FrameError::UnsupportedChannels(0)
        );
        assert_eq!(
            Frame::new(1, 1, 5, vec![0; 5]).unwrap_err(),
            FrameError::UnsupportedChannels(5)
        );
    }

    #[test]
    fn test_shape_compatibility() {
        let a = Frame::filled(2, 2, &[1, 2, 3]).unwrap();
        let b = Frame::filled(2, 2, &[9, 9, 9]).unwrap();
        let c = Frame::filled(2, 2, &[9]).unwrap();
        assert!(a.is_shape_compatible(&b));
        assert!(!a.is_shape_compatible(&c));
        assert_eq!(a.shape().to_string(), "2x2x3");
    }

    #[test]
    fn test_crop_copies_region() {
        // 4x3 single-channel frame with value = y * 10 + x
        let data: Vec<u8> = (0..3)
            .flat_map(|y| (0..4).map(move |x| (y * 10 + x) as u8))
            .collect();
        let frame = Frame::new(4, 3, 1, data).unwrap();

        let cropped = frame.crop(&CropRegion::from_corners((3, 1), (1, 3)));
        assert_eq!(cropped.width(), 2);
        assert_eq!(cropped.height(), 2);
        assert_eq!(cropped.data(), &[11, 12, 21, 22]);
    }

    #[test]
    fn test_crop_clips_to_bounds() {
        let frame = Frame::filled(4, 4, &[5]).unwrap();
        let cropped = frame.crop(&CropRegion {
            min_x: 2,
            min_y: 2,
            max_x: 100,
            max_y: 100,
        });
        assert_eq!(cropped.shape(), FrameShape::new(2, 2, 1));
    }

    #[test]
    fn test_hstack() {
        let left = Frame::filled(2, 2, &[1]).unwrap();
        let right = Frame::filled(1, 2, &[2]).unwrap();
        let stacked = left.hstack(&right).unwrap();
        assert_eq!(stacked.width(), 3);
        assert_eq!(stacked.data(), &[1, 1, 2, 1, 1, 2]);

        let taller = Frame::filled(1, 3, &[2]).unwrap();
        assert!(left.hstack(&taller).is_err());
    }

    #[test]
    fn test_resize_keeps_channels() {
        let frame = Frame::filled(100, 50, &[10, 20, 30]).unwrap();
        let resized = frame.resize_to(20, 10);
        assert_eq!(resized.shape(), FrameShape::new(20, 10, 3));
        assert_eq!(resized.pixel(5, 5), Some(&[10u8, 20, 30][..]));
    }

    #[test]
    fn test_to_rgb_expands_gray() {
        let frame = Frame::filled(2, 1, &[42]).unwrap();
        let rgb = frame.to_rgb();
        assert_eq!(rgb.channels(), 3);
        assert_eq!(rgb.data(), &[42, 42, 42, 42, 42, 42]);
    }

    #[test]
    fn test_is_hole() {
        assert!(is_hole(&[0, 0, 0]));
        assert!(!is_hole(&[0, 1, 0]));
    }
}
