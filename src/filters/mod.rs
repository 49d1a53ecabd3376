// SPDX-License-Identifier: MPL-2.0

//! Stateful per-frame filters for colorized depth frames
//!
//! - [`AveragingFilter`]: temporal mean over the last N frames
//! - [`HoleFillFilter`]: replaces invalid (all-zero) pixels with the previous output

pub mod averaging;
pub mod hole_fill;

pub use averaging::{AveragingFilter, FrameWindow};
pub use hole_fill::HoleFillFilter;
