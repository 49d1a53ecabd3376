// SPDX-License-Identifier: MPL-2.0

//! Error types for the sandbox camera pipeline

use crate::frame::FrameShape;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error for the CLI and the frame source/sink layer
#[derive(Debug, Clone)]
pub enum AppError {
    /// Filter precondition violated
    Filter(FilterError),
    /// Malformed frame buffer
    Frame(FrameError),
    /// Configuration errors
    Config(ConfigError),
    /// Frame source could not produce a frame
    Source(String),
    /// Storage/filesystem errors
    Io(String),
}

/// Precondition violations raised by the per-frame filters
///
/// These indicate caller misuse (feeding frames of different shapes, or asking
/// for an average before any frame was added), not transient runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// `get_average()` was called before any frame was added
    EmptyWindow,
    /// Frames in the averaging window do not share width, height and channel count
    ShapeMismatch {
        expected: FrameShape,
        found: FrameShape,
    },
}

/// Frame construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer length does not equal width * height * channels
    InvalidLayout {
        shape: FrameShape,
        expected_len: usize,
        actual_len: usize,
    },
    /// Channel count outside 1..=4
    UnsupportedChannels(u8),
}

/// Configuration loading and validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read or written
    Io(String),
    /// Config file is not valid JSON for the expected schema
    Parse(String),
    /// A value is out of its valid range
    Invalid(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Filter(e) => write!(f, "Filter error: {}", e),
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Source(msg) => write!(f, "Frame source error: {}", msg),
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::EmptyWindow => {
                write!(f, "Averaging window is empty, add a frame before averaging")
            }
            FilterError::ShapeMismatch { expected, found } => write!(
                f,
                "Frames in the averaging window differ in shape: expected {}, found {}",
                expected, found
            ),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidLayout {
                shape,
                expected_len,
                actual_len,
            } => write!(
                f,
                "Buffer of {} bytes does not match {} ({} bytes expected)",
                actual_len, shape, expected_len
            ),
            FrameError::UnsupportedChannels(channels) => {
                write!(f, "Unsupported channel count: {}", channels)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to access config file: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FilterError {}
impl std::error::Error for FrameError {}
impl std::error::Error for ConfigError {}

// Conversions from sub-errors to AppError
impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::Filter(err)
    }
}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
