// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the driving loop, frame source and PNG sink

use sandbox_camera::markers::{
    ManualClock, MarkerDetector, MarkerObservation, MarkerTracker, Point2f,
};
use sandbox_camera::sink::PngSink;
use sandbox_camera::source::ImageSequenceSource;
use sandbox_camera::{Config, Frame, FramePipeline, FrameShape, OutputMode};
use std::path::PathBuf;
use std::time::Duration;

struct ScriptedDetector(Vec<MarkerObservation>);

impl MarkerDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Vec<MarkerObservation> {
        self.0.clone()
    }
}

fn corner_marker(id: u32, x: f32, y: f32) -> MarkerObservation {
    MarkerObservation::new(
        id,
        [
            Point2f::new(x, y),
            Point2f::new(x + 4.0, y),
            Point2f::new(x + 4.0, y + 4.0),
            Point2f::new(x, y + 4.0),
        ],
    )
}

fn pipeline(config: &Config) -> (FramePipeline<ScriptedDetector, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let detector = ScriptedDetector(vec![
        corner_marker(1, 4.0, 2.0),
        corner_marker(2, 20.0, 12.0),
    ]);
    let tracker = MarkerTracker::with_parts(config, detector, clock.clone());
    (FramePipeline::with_tracker(config, tracker), clock)
}

/// Fresh temporary directory holding `color/` and `depth/` subdirectories
fn temp_dirs() -> (PathBuf, PathBuf, PathBuf) {
    let root = std::env::temp_dir().join(format!("sandbox-camera-test-{}", uuid::Uuid::new_v4()));
    let color = root.join("color");
    let depth = root.join("depth");
    std::fs::create_dir_all(&color).unwrap();
    std::fs::create_dir_all(&depth).unwrap();
    (root, color, depth)
}

#[test]
fn test_crop_mode_crops_both_streams() {
    let config = Config {
        output_mode: OutputMode::Crop,
        ..Config::default()
    };
    let (mut pipeline, _) = pipeline(&config);

    let color = Frame::filled(32, 24, &[9, 9, 9]).unwrap();
    let depth = Frame::filled(32, 24, &[100, 0, 0]).unwrap();
    let out = pipeline.process(color, depth).unwrap();

    assert!(out.redetected);
    assert_eq!(out.color.shape(), FrameShape::new(16, 10, 3));
    assert_eq!(out.depth.shape(), FrameShape::new(16, 10, 3));
}

#[test]
fn test_overlay_mode_keeps_depth_size() {
    let (mut pipeline, _) = pipeline(&Config::default());
    assert_eq!(pipeline.mode(), OutputMode::Overlay);

    let color = Frame::filled(32, 24, &[0, 0, 0]).unwrap();
    let depth = Frame::filled(32, 24, &[100, 0, 0]).unwrap();
    let out = pipeline.process(color.clone(), depth.clone()).unwrap();

    assert_eq!(out.depth, depth);
    assert_eq!(out.color.shape(), color.shape());
    assert_ne!(out.color, color);
}

#[test]
fn test_redetection_is_throttled() {
    let (mut pipeline, clock) = pipeline(&Config::default());
    let frame = || Frame::filled(8, 8, &[1, 1, 1]).unwrap();

    let flags: Vec<bool> = (0..3)
        .map(|_| pipeline.process(frame(), frame()).unwrap().redetected)
        .collect();
    assert_eq!(flags, vec![true, false, false]);

    clock.advance(Duration::from_millis(2001));
    assert!(pipeline.process(frame(), frame()).unwrap().redetected);
}

#[test]
fn test_depth_is_averaged_and_filled() {
    let config = Config {
        average_window_size: 2,
        ..Config::default()
    };
    let (mut pipeline, _) = pipeline(&config);
    let color = || Frame::filled(4, 4, &[0, 0, 0]).unwrap();

    let depth = Frame::filled(4, 4, &[80, 80, 80]).unwrap();
    pipeline.process(color(), depth).unwrap();
    let hole = Frame::filled(4, 4, &[0, 0, 0]).unwrap();
    let out = pipeline.process(color(), hole).unwrap();
    assert_eq!(out.depth.pixel(0, 0), Some(&[40u8, 40, 40][..]));
    assert_eq!(pipeline.averaging().len(), 2);

    pipeline.reset_filters();
    assert!(pipeline.averaging().is_empty());
}

#[test]
fn test_shape_change_inside_window_is_an_error() {
    let (mut pipeline, _) = pipeline(&Config::default());
    let color = Frame::filled(4, 4, &[0, 0, 0]).unwrap();
    let depth = Frame::filled(4, 4, &[1, 1, 1]).unwrap();
    pipeline.process(color.clone(), depth).unwrap();
    let resized = Frame::filled(8, 8, &[1, 1, 1]).unwrap();
    assert!(pipeline.process(color, resized).is_err());
}

#[test]
fn test_source_pairs_sorted_files_and_sink_writes_pngs() {
    let (root, color_dir, depth_dir) = temp_dirs();

    for (i, name) in ["b.png", "a.png", "c.png"].iter().enumerate() {
        let v = (i as u8 + 1) * 40;
        Frame::filled(20, 10, &[v, v, v])
            .unwrap()
            .to_dynamic_image()
            .save(color_dir.join(name))
            .unwrap();
    }
    for name in ["a.png", "b.png"] {
        Frame::filled(20, 10, &[200, 0, 0])
            .unwrap()
            .to_dynamic_image()
            .save(depth_dir.join(name))
            .unwrap();
    }
    std::fs::write(color_dir.join("notes.txt"), "not an image").unwrap();

    let source = ImageSequenceSource::open(&color_dir, &depth_dir).unwrap();
    assert_eq!(source.len(), 2);
    assert!(source.pairs()[0].0.ends_with("a.png"));

    let pairs: Vec<(Frame, Frame)> = source.map(|p| p.unwrap()).collect();
    // a.png was written second, with value 80
    assert_eq!(pairs[0].0.pixel(0, 0), Some(&[80u8, 80, 80][..]));

    let out_dir = root.join("out");
    let mut sink = PngSink::create(&out_dir, (16, 8)).unwrap();
    for (color, depth) in &pairs {
        sink.write(color, depth).unwrap();
    }
    assert_eq!(sink.written(), 2);

    let written = image::open(out_dir.join("frame_000001.png")).unwrap();
    assert_eq!((written.width(), written.height()), (32, 8));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_unreadable_file_yields_error_for_that_pair() {
    let (root, color_dir, depth_dir) = temp_dirs();
    std::fs::write(color_dir.join("0.png"), b"garbage").unwrap();
    Frame::filled(4, 4, &[1, 1, 1])
        .unwrap()
        .to_dynamic_image()
        .save(depth_dir.join("0.png"))
        .unwrap();

    let mut source = ImageSequenceSource::open(&color_dir, &depth_dir).unwrap();
    assert!(source.next().unwrap().is_err());
    assert!(source.next().is_none());

    let _ = std::fs::remove_dir_all(&root);
}
