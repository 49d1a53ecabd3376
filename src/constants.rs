// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Temporal filter defaults
pub mod filters {
    /// Number of depth frames averaged by the temporal filter
    pub const AVERAGE_WINDOW_SIZE: usize = 3;
}

/// Marker tracking defaults
pub mod markers {
    use super::Duration;

    /// Minimum time between two detection passes
    pub const REDETECT_INTERVAL: Duration = Duration::from_secs(2);

    /// Marker ids placed at the corners of the sandbox that bound the crop
    pub const CROP_MARKER_IDS: [u32; 2] = [1, 2];

    /// Number of markers exported by the `markers` command
    pub const PRINTABLE_MARKER_COUNT: u32 = 4;

    /// Side length of an exported marker in pixels (without quiet zone)
    pub const PRINTABLE_MARKER_SIZE: u32 = 200;

    /// White margin around an exported marker, as a fraction of its side
    pub const PRINTABLE_QUIET_ZONE: f32 = 0.25;
}

/// ArUco detector tuning
pub mod detector {
    /// Radius of the adaptive threshold box window ((2r+1)^2 pixels)
    pub const ADAPTIVE_THRESHOLD_RADIUS: u32 = 3;

    /// How much darker than its neighbourhood a pixel must be to count as foreground
    pub const ADAPTIVE_THRESHOLD_CONSTANT: u8 = 7;

    /// Accepted bit errors when matching against the dictionary
    pub const MAX_HAMMING_DISTANCE: u32 = 0;

    /// Minimum contour length as a fraction of the larger frame dimension
    pub const MIN_CONTOUR_FRACTION: f32 = 0.03;

    /// Minimum quad edge length in pixels
    pub const MIN_EDGE_LENGTH: f32 = 10.0;

    /// Douglas-Peucker epsilon as a fraction of contour length
    pub const POLY_EPSILON_FRACTION: f64 = 0.05;

    /// Candidates closer than this (mean corner distance) are merged, in pixels
    pub const MIN_CANDIDATE_DISTANCE: f32 = 10.0;

    /// Same as above, relative to frame width; the larger of the two applies
    pub const MIN_CANDIDATE_DISTANCE_FRACTION: f32 = 0.05;

    /// Pixels sampled per marker cell when warping a candidate
    pub const WARP_CELL_SIZE: usize = 7;
}

/// Output and timing defaults
pub mod output {
    /// Resolution each output frame is scaled to by the sink
    pub const SCALED_OUTPUT_RESOLUTION: (u32, u32) = (640, 480);

    /// Nominal camera frame rate, used for the per-frame budget and replay timing
    pub const FRAME_RATE: u32 = 15;
}

/// Frame source file handling
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Time available to process one frame at the given frame rate
pub fn frame_budget(frame_rate: u32) -> Duration {
    Duration::from_secs(1) / frame_rate.max(1)
}
