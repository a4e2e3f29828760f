//! FrameCounter and FrameExtractor integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and return early when they are missing.

use std::{fs, path::Path};

use framegif::{FrameExtractor, FrameGifError, StopReason, VideoSource, count_frames};
use image::GenericImageView;

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn frame_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort_by(|a, b| natord::compare(a, b));
    names
}

#[test]
fn counts_fixture_frames() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    assert_eq!(count_frames(path).expect("Failed to count"), 100);

    let source = VideoSource::open(path).expect("Failed to open fixture");
    let metadata = source.metadata();
    assert_eq!((metadata.width, metadata.height), (640, 720));
    assert!(metadata.frames_per_second > 24.0 && metadata.frames_per_second < 26.0);
}

#[test]
fn keeps_every_third_frame_after_threshold() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let report = FrameExtractor::new(directory.path())
        .with_drop_threshold(10)
        .with_end_frame(Some(100))
        .extract_file(path)
        .expect("extraction failed");

    assert!(report.is_complete(), "{:?}", report.stop_reason);
    assert_eq!(report.frames_decoded, 100);
    assert_eq!(report.frames_written(), 30);
    assert_eq!(report.expected_frames, 30);

    let expected: Vec<String> = (0..30).map(|index| format!("{index}_frame.png")).collect();
    assert_eq!(frame_names(directory.path()), expected);

    let first = image::open(directory.path().join("0_frame.png")).unwrap();
    assert_eq!(first.dimensions(), (640, 720));
}

#[test]
fn end_frame_stops_decoding() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let report = FrameExtractor::new(directory.path())
        .with_drop_threshold(0)
        .with_end_frame(Some(20))
        .extract_file(path)
        .expect("extraction failed");

    assert_eq!(report.stop_reason, StopReason::EndBound);
    assert_eq!(report.frames_decoded, 20);
    // Positions 3, 6, 9, 12, 15, 18.
    assert_eq!(report.frames_written(), 6);
}

#[test]
fn default_end_is_total_frame_count() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let report = FrameExtractor::new(directory.path())
        .with_drop_threshold(90)
        .with_sample_interval(5)
        .extract_file(path)
        .expect("extraction failed");

    assert_eq!(report.stop_reason, StopReason::TotalFrames);
    // Positions 95 and 100.
    assert_eq!(report.frames_written(), 2);
    assert_eq!(frame_names(directory.path()), ["0_frame.png", "1_frame.png"]);
}

#[test]
fn invalid_range_writes_nothing() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let result = FrameExtractor::new(directory.path())
        .with_drop_threshold(50)
        .with_end_frame(Some(50))
        .extract_file(path);

    match result {
        Err(error @ FrameGifError::InvalidRange { .. }) => {
            assert!(error.is_configuration_error());
        }
        other => panic!("expected InvalidRange, got {other:?}"),
    }
    assert!(frame_names(directory.path()).is_empty());
}

#[test]
fn missing_destination_is_rejected() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let result = FrameExtractor::new(root.path().join("missing"))
        .with_end_frame(Some(10))
        .extract_file(path);
    assert!(matches!(result, Err(FrameGifError::WorkspaceMissing(_))));
}

#[test]
fn write_failure_keeps_earlier_frames() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    // A directory squatting on the second output name makes that write fail.
    fs::create_dir(directory.path().join("1_frame.png")).unwrap();

    let report = FrameExtractor::new(directory.path())
        .with_drop_threshold(0)
        .with_end_frame(Some(30))
        .extract_file(path)
        .expect("a write failure is reported, not returned");

    assert!(matches!(report.stop_reason, StopReason::Failed(_)));
    assert!(!report.is_complete());
    assert!(report.failure().is_some());
    // Position 3 was written, position 6 hit the directory.
    assert_eq!(report.frames_decoded, 6);
    assert_eq!(report.frames_written(), 1);
    assert_eq!(report.written, [directory.path().join("0_frame.png")]);

    let kept = image::open(directory.path().join("0_frame.png")).unwrap();
    assert_eq!(kept.dimensions(), (640, 720));
}
