// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the depth filters

use sandbox_camera::errors::FilterError;
use sandbox_camera::{AveragingFilter, Frame, HoleFillFilter};

/// 4x3 RGB frame whose every byte is derived from `seed`
fn patterned(seed: u8) -> Frame {
    let data = (0..4 * 3 * 3)
        .map(|i| seed.wrapping_mul(7).wrapping_add(i as u8))
        .collect();
    Frame::new(4, 3, 3, data).unwrap()
}

#[test]
fn test_window_keeps_last_frames_in_order() {
    let capacity = 3;
    let mut filter = AveragingFilter::new(capacity);
    for seed in 0..10u8 {
        filter.add_frame(patterned(seed));
    }

    let kept: Vec<&Frame> = filter.frames().collect();
    assert_eq!(kept.len(), capacity);
    for (frame, seed) in kept.iter().zip(7..10u8) {
        assert_eq!(**frame, patterned(seed), "frame for seed {seed}");
    }
}

#[test]
fn test_single_constant_frame_is_returned() {
    let mut filter = AveragingFilter::new(3);
    let frame = Frame::filled(5, 5, &[10, 20, 30]).unwrap();
    filter.add_frame(frame.clone());
    assert_eq!(filter.get_average().unwrap(), frame);
}

#[test]
fn test_average_of_identical_frames() {
    let mut filter = AveragingFilter::new(3);
    for _ in 0..3 {
        filter.add_frame(patterned(4));
    }
    assert_eq!(filter.get_average().unwrap(), patterned(4));
}

#[test]
fn test_average_errors() {
    let mut filter = AveragingFilter::new(2);
    assert_eq!(filter.get_average(), Err(FilterError::EmptyWindow));

    filter.add_frame(Frame::filled(4, 3, &[1, 1, 1]).unwrap());
    filter.add_frame(Frame::filled(4, 3, &[1]).unwrap());
    assert!(matches!(
        filter.get_average(),
        Err(FilterError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_hole_fill_sequence() {
    let mut filter = HoleFillFilter::new();

    // F: pixel 0 valid, pixel 1 valid, pixel 2 always a hole
    let f = Frame::new(3, 1, 3, vec![10, 10, 10, 20, 20, 20, 0, 0, 0]).unwrap();
    assert_eq!(filter.process(f.clone()), f);

    // G: pixel 0 is a hole, pixel 1 has a new value
    let g = Frame::new(3, 1, 3, vec![0, 0, 0, 25, 25, 25, 0, 0, 0]).unwrap();
    let out = filter.process(g);
    assert_eq!(out.pixel(0, 0), Some(&[10u8, 10, 10][..]));
    assert_eq!(out.pixel(1, 0), Some(&[25u8, 25, 25][..]));
    assert_eq!(out.pixel(2, 0), Some(&[0u8, 0, 0][..]));

    // H: everything is a hole, the latest valid values carry forward
    let h = Frame::filled(3, 1, &[0, 0, 0]).unwrap();
    let out = filter.process(h);
    assert_eq!(out.data(), &[10, 10, 10, 25, 25, 25, 0, 0, 0]);
}

#[test]
fn test_average_then_fill() {
    let mut averaging = AveragingFilter::new(2);
    let mut fill = HoleFillFilter::new();

    averaging.add_frame(Frame::filled(2, 2, &[40, 40, 40]).unwrap());
    let first = fill.process(averaging.get_average().unwrap());
    assert_eq!(first.pixel(1, 1), Some(&[40u8, 40, 40][..]));

    // Averaging a hole with a valid value is no longer a hole
    averaging.add_frame(Frame::filled(2, 2, &[0, 0, 0]).unwrap());
    let second = fill.process(averaging.get_average().unwrap());
    assert_eq!(second.pixel(0, 0), Some(&[20u8, 20, 20][..]));

    // Two holes in a row average to a hole, which is then filled
    averaging.add_frame(Frame::filled(2, 2, &[0, 0, 0]).unwrap());
    let third = fill.process(averaging.get_average().unwrap());
    assert_eq!(third.pixel(0, 0), Some(&[20u8, 20, 20][..]));
}
