// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Writing printable markers
//! - Running the filter pipeline over recorded frames
//! - Printing the default configuration

use chrono::Local;
use sandbox_camera::config::Config;
use sandbox_camera::constants::markers::PRINTABLE_QUIET_ZONE;
use sandbox_camera::markers::dictionary::MARKER_COUNT;
use sandbox_camera::markers::printable::with_quiet_zone;
use sandbox_camera::sink::PngSink;
use sandbox_camera::source::ImageSequenceSource;
use sandbox_camera::{FramePipeline, MarkerTracker, OutputMode};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Write `count` printable markers (ids 1..=count) as PNG files
pub fn write_markers(
    count: u32,
    size: Option<u32>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(None)?;
    let side = size.unwrap_or(config.printable_marker_size);
    if side == 0 {
        return Err("Marker size must be at least 1 pixel".into());
    }

    if count >= MARKER_COUNT {
        return Err(format!("Marker id {count} is not in the dictionary").into());
    }

    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;

    let tracker = MarkerTracker::new(&config);
    let markers = tracker.render_printable_markers(count, side);
    for (id, marker) in (1u32..).zip(&markers) {
        let printed = with_quiet_zone(marker, PRINTABLE_QUIET_ZONE);
        let path = dir.join(format!("marker_{}.png", id));
        printed.to_dynamic_image().save(&path)?;
        println!("Wrote {}", path.display());
    }

    info!(count, side, dir = %dir.display(), "Printable markers written");
    Ok(())
}

/// Run the pipeline over recorded frame pairs and write the results
pub fn process(
    color_dir: &Path,
    depth_dir: &Path,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    mode: Option<OutputMode>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(config_path.as_deref())?;
    if let Some(mode) = mode {
        config.output_mode = mode;
    }

    let source = ImageSequenceSource::open(color_dir, depth_dir)?;
    if source.is_empty() {
        println!("No frame pairs found.");
        return Ok(());
    }

    let output_dir = output.unwrap_or_else(default_output_dir);
    let mut sink = PngSink::create(&output_dir, config.output_resolution)?;
    let mut pipeline = FramePipeline::new(&config);

    println!(
        "Processing {} frame pairs ({:?} mode)",
        source.len(),
        config.output_mode
    );

    let start = Instant::now();
    let mut skipped = 0usize;
    let mut detections = 0usize;
    for (index, pair) in source.enumerate() {
        let (color, depth) = match pair {
            Ok(pair) => pair,
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable frame pair");
                skipped += 1;
                continue;
            }
        };

        let processed = match pipeline.process(color, depth) {
            Ok(processed) => processed,
            Err(e) => {
                warn!(index, error = %e, "Skipping frame pair");
                skipped += 1;
                continue;
            }
        };
        if processed.redetected {
            detections += 1;
        }

        sink.write(&processed.color, &processed.depth)?;
    }

    let markers = pipeline
        .tracker()
        .cached()
        .map(|r| r.len())
        .unwrap_or_default();
    info!(
        written = sink.written(),
        skipped,
        detections,
        elapsed_ms = start.elapsed().as_millis(),
        "Processing finished"
    );

    println!(
        "Wrote {} frames to {} ({} skipped, {} markers in last detection)",
        sink.written(),
        sink.dir().display(),
        skipped,
        markers
    );
    Ok(())
}

/// Print the built-in defaults as JSON
pub fn print_default_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", Config::default().to_json()?);
    if let Some(path) = Config::default_path() {
        info!(path = %path.display(), "Default config file location");
    }
    Ok(())
}

fn default_output_dir() -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("sandbox-camera_{}", timestamp))
}
