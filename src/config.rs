// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline configuration
//!
//! The configuration is stored as JSON. Every field has a default, so a file
//! only needs to name the values it overrides.

use crate::constants::{detector, filters, markers, output};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// What the pipeline does with the cached markers every frame
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Draw marker outlines and ids onto the color frame
    #[default]
    Overlay,
    /// Crop color and depth frames to the rectangle spanned by two markers
    Crop,
}

/// Which two cached markers span the crop rectangle
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CropMarkerSelection {
    /// First and second marker in detection order, regardless of id
    #[default]
    DetectionOrder,
    /// Markers whose ids equal `crop_marker_ids`, in that order
    ConfiguredIds,
}

/// ArUco detector tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Radius of the adaptive threshold window
    pub adaptive_threshold_radius: u32,
    /// Darkness margin below the local mean for a foreground pixel
    pub adaptive_threshold_constant: u8,
    /// Accepted bit errors when matching the dictionary
    pub max_hamming_distance: u32,
    /// Minimum contour length relative to the larger frame dimension
    pub min_contour_fraction: f32,
    /// Minimum quad edge length in pixels
    pub min_edge_length: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            adaptive_threshold_radius: detector::ADAPTIVE_THRESHOLD_RADIUS,
            adaptive_threshold_constant: detector::ADAPTIVE_THRESHOLD_CONSTANT,
            max_hamming_distance: detector::MAX_HAMMING_DISTANCE,
            min_contour_fraction: detector::MIN_CONTOUR_FRACTION,
            min_edge_length: detector::MIN_EDGE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of depth frames in the averaging window
    pub average_window_size: usize,
    /// Minimum time between marker detection passes, in milliseconds
    pub redetect_interval_ms: u64,
    /// Marker ids expected at the crop corners
    pub crop_marker_ids: [u32; 2],
    /// How the two crop markers are picked from a detection
    pub crop_marker_selection: CropMarkerSelection,
    /// Overlay markers or crop to them
    pub output_mode: OutputMode,
    /// Resolution (width, height) the sink scales each frame to
    pub output_resolution: (u32, u32),
    /// Nominal camera frame rate
    pub frame_rate: u32,
    /// Side length of exported printable markers in pixels
    pub printable_marker_size: u32,
    /// Marker detector tuning
    pub detector: DetectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            average_window_size: filters::AVERAGE_WINDOW_SIZE,
            redetect_interval_ms: markers::REDETECT_INTERVAL.as_millis() as u64,
            crop_marker_ids: markers::CROP_MARKER_IDS,
            crop_marker_selection: CropMarkerSelection::default(),
            output_mode: OutputMode::default(),
            output_resolution: output::SCALED_OUTPUT_RESOLUTION,
            frame_rate: output::FRAME_RATE,
            printable_marker_size: markers::PRINTABLE_MARKER_SIZE,
            detector: DetectorConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location: `<config dir>/sandbox-camera/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sandbox-camera").join("config.json"))
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config");
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Load the file at `path` if given, else the default location if it exists,
    /// else the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.is_file() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Parse and validate JSON text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.average_window_size == 0 {
            return Err(ConfigError::Invalid(
                "average_window_size must be at least 1".into(),
            ));
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be at least 1".into()));
        }
        if self.output_resolution.0 == 0 || self.output_resolution.1 == 0 {
            return Err(ConfigError::Invalid(format!(
                "output_resolution {}x{} has a zero dimension",
                self.output_resolution.0, self.output_resolution.1
            )));
        }
        if self.crop_marker_ids[0] == self.crop_marker_ids[1] {
            return Err(ConfigError::Invalid(format!(
                "crop_marker_ids must name two different markers, got {:?}",
                self.crop_marker_ids
            )));
        }
        if self.printable_marker_size == 0 {
            return Err(ConfigError::Invalid(
                "printable_marker_size must be at least 1".into(),
            ));
        }

        let d = &self.detector;
        if d.adaptive_threshold_radius == 0 {
            return Err(ConfigError::Invalid(
                "detector.adaptive_threshold_radius must be at least 1".into(),
            ));
        }
        if d.adaptive_threshold_constant == 0 {
            return Err(ConfigError::Invalid(
                "detector.adaptive_threshold_constant must be at least 1".into(),
            ));
        }
        if !(d.min_contour_fraction > 0.0 && d.min_contour_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "detector.min_contour_fraction must be in (0, 1), got {}",
                d.min_contour_fraction
            )));
        }
        if !(d.min_edge_length > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "detector.min_edge_length must be positive, got {}",
                d.min_edge_length
            )));
        }
        Ok(())
    }

    pub fn redetect_interval(&self) -> Duration {
        Duration::from_millis(self.redetect_interval_ms)
    }

    /// Time between two frames at the configured frame rate
    pub fn frame_interval(&self) -> Duration {
        crate::constants::frame_budget(self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{ "average_window_size": 5 }"#).unwrap();
        assert_eq!(config.average_window_size, 5);
        assert_eq!(config.redetect_interval(), Duration::from_secs(2));
        assert_eq!(config.detector, DetectorConfig::default());
    }

    #[test]
    fn test_enums_use_snake_case() {
        let json = r#"{ "output_mode": "crop", "crop_marker_selection": "configured_ids" }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.output_mode, OutputMode::Crop);
        assert_eq!(
            config.crop_marker_selection,
            CropMarkerSelection::ConfiguredIds
        );
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = Config::from_json(r#"{ "average_window_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_frame_interval() {
        let config = Config {
            frame_rate: 20,
            ..Config::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(50));
    }
}
