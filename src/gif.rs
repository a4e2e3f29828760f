//! Animated GIF assembly.
//!
//! [`GifAssembler`] loads every frame in a working directory in natural
//! file-name order and encodes them into one GIF named after the current
//! local time, e.g. `result/2024년03월05일_07시08분09초.gif`.
//!
//! # Example
//!
//! ```no_run
//! use framegif::{GifAssembler, GifOptions};
//!
//! let report = GifAssembler::new("./assets/image", "result")
//!     .with_options(GifOptions::new().fps(12.0))
//!     .assemble()?;
//!
//! if let Some(path) = &report.path {
//!     println!("{} frames -> {}", report.frame_count, path.display());
//! }
//! # Ok::<(), framegif::FrameGifError>(())
//! ```

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use gif::{Encoder, Frame, Repeat};
use image::DynamicImage;

use crate::error::FrameGifError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::workspace::Workspace;

/// `strftime` pattern for output file names, second granularity.
pub const OUTPUT_NAME_FORMAT: &str = "%Y년%m월%d일_%H시%M분%S초";

/// Configuration for GIF encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct GifOptions {
    /// Playback rate in frames per second (default: 12).
    pub fps: f64,
    /// How many times the GIF repeats. `None` means loop forever.
    pub repeat: Option<u16>,
    /// Palette quantiser speed, 1 (best) to 30 (fastest). Default 10.
    pub speed: i32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            fps: 12.0,
            repeat: None,
            speed: 10,
        }
    }
}

impl GifOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the playback rate.
    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Set the repeat count. `None` means loop forever.
    pub fn repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the quantiser speed, clamped to `1..=30`.
    pub fn speed(mut self, speed: i32) -> Self {
        self.speed = speed.clamp(1, 30);
        self
    }

    /// Per-frame delay in hundredths of a second.
    ///
    /// GIF delays are whole centiseconds, so 12 fps becomes 8 (≈ 12.5 fps).
    ///
    /// # Errors
    ///
    /// [`FrameGifError::GifEncodeError`] if `fps` is not a positive number.
    pub fn frame_delay(&self) -> Result<u16, FrameGifError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(FrameGifError::GifEncodeError(format!(
                "Frame rate must be positive, got {}",
                self.fps
            )));
        }
        Ok((100.0 / self.fps).round().clamp(1.0, u16::MAX as f64) as u16)
    }
}

/// Result of one assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct GifReport {
    /// The written GIF, or `None` if the directory held no frames.
    pub path: Option<PathBuf>,
    /// Frames encoded.
    pub frame_count: usize,
}

/// Builds the timestamped GIF from a working directory.
#[derive(Clone)]
pub struct GifAssembler {
    workspace: Workspace,
    output_dir: PathBuf,
    options: GifOptions,
    progress: Arc<dyn ProgressCallback>,
}

impl std::fmt::Debug for GifAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifAssembler")
            .field("workspace", &self.workspace)
            .field("output_dir", &self.output_dir)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GifAssembler {
    /// Read frames from `frames_dir`, write the GIF into `output_dir`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(frames_dir: P, output_dir: Q) -> Self {
        Self {
            workspace: Workspace::new(frames_dir),
            output_dir: output_dir.as_ref().to_path_buf(),
            options: GifOptions::default(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the encoding options.
    #[must_use]
    pub fn with_options(mut self, options: GifOptions) -> Self {
        self.options = options;
        self
    }

    /// Report each loaded frame to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Load the frames in natural order and write the GIF.
    ///
    /// The output directory is created if missing.
    ///
    /// An empty frame directory writes no file at all and reports
    /// `path: None` with a warning, unlike [`encode_gif`], which emits a
    /// header-only 1×1 GIF for zero frames.
    pub fn assemble(&self) -> Result<GifReport, FrameGifError> {
        self.assemble_at(&Local::now())
    }

    /// [`assemble`](Self::assemble) with an explicit timestamp for the name.
    pub fn assemble_at<Tz>(&self, timestamp: &DateTime<Tz>) -> Result<GifReport, FrameGifError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let frames = self.load_frames()?;
        if frames.is_empty() {
            log::warn!(
                "No frames in {}; no GIF written",
                self.workspace.path().display()
            );
            return Ok(GifReport {
                path: None,
                frame_count: 0,
            });
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(output_file_name(timestamp));
        let file = File::create(&path)?;
        encode_gif(BufWriter::new(file), &frames, &self.options)?;

        log::info!("Wrote {} frames to {}", frames.len(), path.display());
        Ok(GifReport {
            path: Some(path),
            frame_count: frames.len(),
        })
    }

    /// Every frame in the directory, decoded, in natural file-name order.
    pub fn load_frames(&self) -> Result<Vec<DynamicImage>, FrameGifError> {
        let paths = self.workspace.frame_paths()?;
        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::GifAssembly,
            Some(paths.len() as u64),
            1,
        );

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            frames.push(image::open(path)?);
            tracker.advance();
        }
        Ok(frames)
    }
}

/// `<YYYY년MM월DD일_HH시MM분SS초>.gif` for `timestamp`.
pub fn output_file_name<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}.gif", timestamp.format(OUTPUT_NAME_FORMAT))
}

/// Encode `frames` as an animated GIF into `writer`.
///
/// The logical screen takes the size of the first frame. Each frame is
/// quantised to a 256-colour palette by the `gif` crate. Writing zero frames
/// produces a header-only 1×1 GIF; [`GifAssembler::assemble`] never calls it
/// that way.
pub fn encode_gif<W: Write>(
    writer: W,
    frames: &[DynamicImage],
    options: &GifOptions,
) -> Result<(), FrameGifError> {
    let delay = options.frame_delay()?;
    log::debug!(
        "Encoding {} frames (delay={}cs, repeat={:?}, speed={})",
        frames.len(),
        delay,
        options.repeat,
        options.speed,
    );

    let (width, height) = match frames.first() {
        Some(first) => gif_dimensions(first)?,
        None => (1, 1),
    };

    let mut encoder = Encoder::new(writer, width, height, &[])
        .map_err(|e| FrameGifError::GifEncodeError(format!("Failed to create GIF encoder: {e}")))?;

    let repeat = match options.repeat {
        None => Repeat::Infinite,
        Some(n) => Repeat::Finite(n),
    };
    encoder
        .set_repeat(repeat)
        .map_err(|e| FrameGifError::GifEncodeError(format!("Failed to set GIF repeat: {e}")))?;

    let speed = options.speed.clamp(1, 30);
    for image in frames {
        let (frame_width, frame_height) = gif_dimensions(image)?;
        let mut pixels = image.to_rgba8().into_raw();

        let mut gif_frame = Frame::from_rgba_speed(frame_width, frame_height, &mut pixels, speed);
        gif_frame.delay = delay;

        encoder
            .write_frame(&gif_frame)
            .map_err(|e| FrameGifError::GifEncodeError(format!("Failed to write GIF frame: {e}")))?;
    }

    let mut writer = encoder
        .into_inner()
        .map_err(|e| FrameGifError::GifEncodeError(format!("Failed to finish GIF: {e}")))?;
    writer.flush()?;
    Ok(())
}

fn gif_dimensions(image: &DynamicImage) -> Result<(u16, u16), FrameGifError> {
    let too_large = || {
        FrameGifError::GifEncodeError(format!(
            "Frame {}x{} exceeds GIF size limit",
            image.width(),
            image.height()
        ))
    };
    let width = u16::try_from(image.width()).map_err(|_| too_large())?;
    let height = u16::try_from(image.height()).map_err(|_| too_large())?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn twelve_fps_is_eight_centiseconds() {
        assert_eq!(GifOptions::default().frame_delay().unwrap(), 8);
        assert_eq!(GifOptions::new().fps(10.0).frame_delay().unwrap(), 10);
        assert_eq!(GifOptions::new().fps(1000.0).frame_delay().unwrap(), 1);
    }

    #[test]
    fn non_positive_fps_rejected() {
        assert!(GifOptions::new().fps(0.0).frame_delay().is_err());
        assert!(GifOptions::new().fps(f64::NAN).frame_delay().is_err());
    }

    #[test]
    fn speed_is_clamped() {
        assert_eq!(GifOptions::new().speed(0).speed, 1);
        assert_eq!(GifOptions::new().speed(99).speed, 30);
    }

    #[test]
    fn file_name_uses_localised_units() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(output_file_name(&timestamp), "2024년03월05일_07시08분09초.gif");
    }

    #[test]
    fn encodes_every_frame_with_delay() {
        let frames: Vec<DynamicImage> = (0..3u8)
            .map(|shade| {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([shade * 80, 0, 0])))
            })
            .collect();

        let mut buffer = Vec::new();
        encode_gif(&mut buffer, &frames, &GifOptions::default()).unwrap();

        let mut decoder = gif::DecodeOptions::new().read_info(buffer.as_slice()).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (6, 4));
        let mut count = 0;
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            assert_eq!(frame.delay, 8);
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn zero_frames_encode_header_only() {
        let mut buffer = Vec::new();
        encode_gif(&mut buffer, &[], &GifOptions::default()).unwrap();

        let mut decoder = gif::DecodeOptions::new().read_info(buffer.as_slice()).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (1, 1));
        assert!(decoder.read_next_frame().unwrap().is_none());
    }
}
