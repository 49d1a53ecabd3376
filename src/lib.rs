// SPDX-License-Identifier: MPL-2.0

//! Sandbox camera - depth and color frame processing for an AR sandbox rig
//!
//! A depth camera looks down at a sandbox. Its colorized depth stream is
//! smoothed over time and patched where the sensor reports no reading, and
//! printed ArUco markers on the sandbox rim define the region of interest
//! that both streams are cropped to.
//!
//! # Architecture
//!
//! - [`frame`]: the frame buffer shared by every stage
//! - [`filters`]: temporal averaging and hole filling for depth frames
//! - [`markers`]: ArUco detection, throttled tracking, crop and overlay
//! - [`pipeline`]: the per-frame driving loop tying the stages together
//! - [`source`]: recorded frame pairs read from image directories
//! - [`sink`]: side-by-side PNG output
//! - [`config`]: JSON configuration

pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod frame;
pub mod markers;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use config::{Config, CropMarkerSelection, OutputMode};
pub use errors::{AppError, AppResult, FilterError};
pub use filters::{AveragingFilter, HoleFillFilter};
pub use frame::{CropRegion, Frame, FrameShape};
pub use markers::{ArucoDetector, MarkerDetector, MarkerObservation, MarkerTracker};
pub use pipeline::{FramePipeline, ProcessedFrames};
