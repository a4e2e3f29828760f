//! Error types for the `framegif` crate.
//!
//! This module defines [`FrameGifError`], the single error type returned by
//! every fallible stage of the pipeline. Variants carry the paths and frame
//! bounds involved so a failure can be diagnosed from the message alone.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegif` operations.
///
/// Configuration mistakes ([`InvalidRange`](FrameGifError::InvalidRange),
/// [`InvalidInterval`](FrameGifError::InvalidInterval)) are recoverable: the
/// pipeline logs them and skips the stage. Filesystem and open failures end
/// the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameGifError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The drop threshold does not leave any frame before the end bound.
    #[error(
        "Invalid frame range: drop threshold ({drop_threshold}) must be less than end frame ({end_frame})"
    )]
    InvalidRange {
        /// Frames at or below this position are discarded.
        drop_threshold: u64,
        /// Extraction stops at this position.
        end_frame: u64,
    },

    /// A sampling interval of zero was provided.
    #[error("Sampling interval must be greater than zero")]
    InvalidInterval,

    /// The working directory was expected to exist but does not.
    #[error("Working directory {0} does not exist")]
    WorkspaceMissing(PathBuf),

    /// A crop geometry string could not be parsed, or has a zero dimension.
    #[error("Invalid crop geometry: {0}")]
    InvalidCrop(String),

    /// The requested filter name is not one of the known kernels.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    /// GIF encoding failed.
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while loading, filtering or saving.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FrameGifError {
    fn from(error: FfmpegError) -> Self {
        FrameGifError::FfmpegError(error.to_string())
    }
}

impl FrameGifError {
    /// Returns `true` for errors caused by pipeline parameters rather than
    /// by the video or the filesystem.
    ///
    /// The pipeline treats these as "skip this stage" instead of aborting.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FrameGifError::InvalidRange { .. }
                | FrameGifError::InvalidInterval
                | FrameGifError::InvalidCrop(_)
                | FrameGifError::UnknownFilter(_)
        )
    }
}
