//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::path::Path;

use framegif::{FrameGifError, Pipeline, PipelineConfig, VideoSource, count_frames};

#[test]
fn open_nonexistent_file() {
    let result = VideoSource::open("this_file_does_not_exist.mp4");
    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    assert!(count_frames(&invalid_file_path).is_err());
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.m4a";
    if !Path::new(path).exists() {
        return;
    }

    let result = VideoSource::open(path);
    assert!(matches!(result, Err(FrameGifError::NoVideoStream)));
}

#[test]
fn pipeline_requires_existing_workspace() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let config = PipelineConfig::new()
        .with_workspace(root.path().join("image"))
        .with_output_dir(root.path().join("result"))
        .with_video_path("tests/fixtures/sample_video.mp4");

    let result = Pipeline::new(config).run();
    assert!(matches!(result, Err(FrameGifError::WorkspaceMissing(_))));
    assert!(!root.path().join("result").exists());
}

#[test]
fn pipeline_fails_on_missing_video() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let workspace = root.path().join("image");
    std::fs::create_dir(&workspace).unwrap();

    let config = PipelineConfig::new()
        .with_workspace(&workspace)
        .with_output_dir(root.path().join("result"))
        .with_video_path(root.path().join("missing.mp4"));

    let result = Pipeline::new(config).run();
    assert!(matches!(result, Err(FrameGifError::FileOpen { .. })));
}

#[test]
fn configuration_errors_are_classified() {
    let range = FrameGifError::InvalidRange {
        drop_threshold: 10,
        end_frame: 5,
    };
    assert!(range.is_configuration_error());
    assert!(range.to_string().contains("drop threshold (10)"));
    assert!(FrameGifError::InvalidInterval.is_configuration_error());
    assert!(!FrameGifError::NoVideoStream.is_configuration_error());
}
