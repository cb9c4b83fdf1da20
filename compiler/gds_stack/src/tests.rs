#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn test_shallow_recursion() {
    fn factorial(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n <= 1 { 1 } else { n * factorial(n - 1) })
    }

    assert_eq!(factorial(10), 3_628_800);
}

#[test]
fn test_deep_recursion() {
    fn deep_recurse(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
    }

    assert_eq!(deep_recurse(100_000), 100_000);
}

#[test]
fn check_depth_accepts_up_to_max() {
    assert!(check_depth(64, Some(64), DepthLimit::ReadingStack).is_ok());
    assert!(check_depth(1_000_000, None, DepthLimit::ReadingStack).is_ok());
}

#[test]
fn check_depth_reports_limit() {
    let err = check_depth(65, Some(64), DepthLimit::ReadingStack).unwrap_err();
    assert_eq!(
        err,
        DepthOverflow {
            depth: 65,
            max: 64,
            limit: DepthLimit::ReadingStack,
        }
    );
    assert_eq!(
        err.to_string(),
        "reading stack depth 65 exceeds the configured maximum of 64"
    );
}

#[test]
fn frame_counter_tracks_depth_and_peak() {
    let mut frames = FrameCounter::new(Some(3));
    frames.enter().unwrap();
    frames.enter().unwrap();
    frames.leave();
    frames.enter().unwrap();
    frames.enter().unwrap();
    assert_eq!(frames.depth(), 3);
    assert_eq!(frames.peak(), 3);

    let err = frames.enter().unwrap_err();
    assert_eq!(err.limit, DepthLimit::TraceFrames);
    assert_eq!(err.max, 3);
    assert_eq!(err.depth, 4);
    assert_eq!(frames.depth(), 3);
}

#[test]
fn unlimited_frame_counter_never_fails() {
    let mut frames = FrameCounter::new(None);
    for _ in 0..10_000 {
        frames.enter().unwrap();
    }
    assert_eq!(frames.depth(), 10_000);
}
