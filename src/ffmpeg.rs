//! FFmpeg initialisation and log level control.
//!
//! FFmpeg writes its own diagnostics straight to stderr, independently of the
//! Rust [`log`](https://crates.io/crates/log) facade that the rest of this
//! crate uses. [`FfmpegLogLevel`] lets the binary (or a library user) quiet
//! that output without depending on `ffmpeg-next` directly.
//!
//! # Example
//!
//! ```no_run
//! use framegif::FfmpegLogLevel;
//!
//! framegif::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let frames = framegif::count_frames("input.mp4")?;
//! # Ok::<(), framegif::FrameGifError>(())
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::FrameGifError;

/// FFmpeg internal log verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(FfmpegLogLevel::Quiet),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "debug" => Ok(FfmpegLogLevel::Debug),
            other => Err(format!("unsupported FFmpeg log level: {other}")),
        }
    }
}

/// Set FFmpeg's stderr verbosity. Does not affect `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Initialise FFmpeg. Safe to call more than once.
pub(crate) fn initialise() -> Result<(), FrameGifError> {
    ffmpeg_next::init().map_err(|error| {
        FrameGifError::FfmpegError(format!("FFmpeg initialisation failed: {error}"))
    })
}
