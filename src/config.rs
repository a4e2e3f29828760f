//! Pipeline configuration.
//!
//! [`PipelineConfig`] is a builder carrying every parameter of a run: paths,
//! frame bounds, sampling interval, post-processing and GIF settings, and the
//! progress callback. Each stage receives only the part it needs, so stages
//! can be driven on their own with injected values.
//!
//! # Example
//!
//! ```no_run
//! use framegif::{CropRect, FilterKind, PipelineConfig};
//!
//! let config = PipelineConfig::new()
//!     .with_video_path("clips/intro.mp4")
//!     .with_drop_threshold(30)
//!     .with_end_frame(Some(300))
//!     .with_filter(FilterKind::Sharpen)
//!     .with_crop(CropRect::new(0, 0, 320, 240))
//!     .with_fps(15.0);
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::FrameGifError;
use crate::gif::GifOptions;
use crate::postprocess::{FilterKind, PostProcessOptions};
use crate::progress::{NoOpProgress, ProgressCallback};
use crate::sampling::DEFAULT_SAMPLE_INTERVAL;

/// Default working directory for extracted frames.
pub const DEFAULT_WORKSPACE: &str = "./assets/image";
/// Default input video.
pub const DEFAULT_VIDEO_PATH: &str = "./assets/movie/Test01.mp4";
/// Default directory receiving the finished GIF.
pub const DEFAULT_OUTPUT_DIR: &str = "result";
/// Default number of leading frames to discard.
pub const DEFAULT_DROP_THRESHOLD: u64 = 10;

/// A rectangle in pixel coordinates, used for cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// Create a rectangle with origin `(x, y)` and the given size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Default for CropRect {
    /// Origin `(0, 0)`, 504 × 540.
    fn default() -> Self {
        Self::new(0, 0, 504, 540)
    }
}

impl Display for CropRect {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for CropRect {
    type Err = FrameGifError;

    /// Parse `WxH` or `WxH+X+Y`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || FrameGifError::InvalidCrop(value.to_string());
        let trimmed = value.trim();

        let mut parts = trimmed.split('+');
        let size = parts.next().ok_or_else(invalid)?;
        let (width, height) = size
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;

        let offsets: Vec<&str> = parts.collect();
        let (x, y) = match offsets.as_slice() {
            [] => (0, 0),
            [x, y] => (
                x.trim().parse().map_err(|_| invalid())?,
                y.trim().parse().map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };

        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self::new(x, y, width, height))
    }
}

/// Everything one pipeline run needs.
///
/// A default-constructed config reproduces the stock run: read
/// `./assets/movie/Test01.mp4`, drop 10 frames, keep every 3rd frame until
/// the end of the video, apply the detail filter and a 504×540 crop, write a
/// 12 fps GIF into `result/`.
#[derive(Clone)]
pub struct PipelineConfig {
    pub(crate) video_path: PathBuf,
    pub(crate) workspace: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) drop_threshold: u64,
    /// `None` means "the video's total frame count".
    pub(crate) end_frame: Option<u64>,
    pub(crate) sample_interval: u64,
    pub(crate) post_process: PostProcessOptions,
    pub(crate) gif: GifOptions,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for PipelineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineConfig")
            .field("video_path", &self.video_path)
            .field("workspace", &self.workspace)
            .field("output_dir", &self.output_dir)
            .field("drop_threshold", &self.drop_threshold)
            .field("end_frame", &self.end_frame)
            .field("sample_interval", &self.sample_interval)
            .field("post_process", &self.post_process)
            .field("gif", &self.gif)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create a configuration with the stock defaults.
    pub fn new() -> Self {
        Self {
            video_path: PathBuf::from(DEFAULT_VIDEO_PATH),
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            drop_threshold: DEFAULT_DROP_THRESHOLD,
            end_frame: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            post_process: PostProcessOptions::default(),
            gif: GifOptions::default(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the input video.
    #[must_use]
    pub fn with_video_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.video_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the working directory holding extracted frames.
    #[must_use]
    pub fn with_workspace<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.workspace = path.as_ref().to_path_buf();
        self
    }

    /// Set the directory the GIF is written into.
    #[must_use]
    pub fn with_output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set how many leading frames are discarded.
    #[must_use]
    pub fn with_drop_threshold(mut self, frames: u64) -> Self {
        self.drop_threshold = frames;
        self
    }

    /// Set the frame position extraction stops at. `None` uses the video's
    /// total frame count.
    #[must_use]
    pub fn with_end_frame(mut self, end_frame: Option<u64>) -> Self {
        self.end_frame = end_frame;
        self
    }

    /// Keep one frame in every `interval`. Zero is rejected at extraction.
    #[must_use]
    pub fn with_sample_interval(mut self, interval: u64) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Replace the post-processing options wholesale.
    #[must_use]
    pub fn with_post_process(mut self, options: PostProcessOptions) -> Self {
        self.post_process = options;
        self
    }

    /// Toggle the batch filter + crop pass.
    #[must_use]
    pub fn with_batch_filter(mut self, enabled: bool) -> Self {
        self.post_process.enabled = enabled;
        self
    }

    /// Toggle the diagnostic preview of the first frame.
    #[must_use]
    pub fn with_preview(mut self, enabled: bool) -> Self {
        self.post_process.preview = enabled;
        self
    }

    /// Set the convolution filter applied in the batch pass.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterKind) -> Self {
        self.post_process.filter = filter;
        self
    }

    /// Set the crop rectangle.
    #[must_use]
    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.post_process.crop = crop;
        self
    }

    /// Replace the GIF options wholesale.
    #[must_use]
    pub fn with_gif(mut self, options: GifOptions) -> Self {
        self.gif = options;
        self
    }

    /// Set the GIF frame rate.
    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.gif = self.gif.fps(fps);
        self
    }

    /// Attach a progress callback shared by all stages.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Input video path.
    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// Working directory.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// GIF output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Leading frames discarded.
    pub fn drop_threshold(&self) -> u64 {
        self.drop_threshold
    }

    /// Configured end frame, if any.
    pub fn end_frame(&self) -> Option<u64> {
        self.end_frame
    }

    /// Sampling interval.
    pub fn sample_interval(&self) -> u64 {
        self.sample_interval
    }

    /// Post-processing options.
    pub fn post_process(&self) -> &PostProcessOptions {
        &self.post_process
    }

    /// GIF options.
    pub fn gif(&self) -> &GifOptions {
        &self.gif
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.workspace(), Path::new("./assets/image"));
        assert_eq!(config.video_path(), Path::new("./assets/movie/Test01.mp4"));
        assert_eq!(config.output_dir(), Path::new("result"));
        assert_eq!(config.drop_threshold(), 10);
        assert_eq!(config.end_frame(), None);
        assert_eq!(config.sample_interval(), 3);
        assert_eq!(config.post_process().crop, CropRect::new(0, 0, 504, 540));
        assert!(config.post_process().enabled);
        assert!(!config.post_process().preview);
        assert_eq!(config.gif().fps, 12.0);
    }

    #[test]
    fn debug_hides_callback() {
        let debug = format!("{:?}", PipelineConfig::new());
        assert!(debug.contains("PipelineConfig"));
        assert!(debug.contains("drop_threshold: 10"));
        assert!(!debug.contains("progress"));
    }

    #[test]
    fn parse_size_only() {
        let crop: CropRect = "504x540".parse().unwrap();
        assert_eq!(crop, CropRect::new(0, 0, 504, 540));
    }

    #[test]
    fn parse_with_offset() {
        let crop: CropRect = "320X240+16+8".parse().unwrap();
        assert_eq!(crop, CropRect::new(16, 8, 320, 240));
        assert_eq!(crop.to_string(), "320x240+16+8");
    }

    #[test]
    fn reject_bad_geometry() {
        for bad in ["", "504", "0x540", "504x0", "axb", "10x10+1", "10x10+1+2+3"] {
            assert!(bad.parse::<CropRect>().is_err(), "{bad:?} should not parse");
        }
    }
}
