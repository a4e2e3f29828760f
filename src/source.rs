//! Opening a video and counting its frames.
//!
//! [`VideoSource`] owns the FFmpeg demuxer for one video file together with
//! the cached [`VideoMetadata`] of its best video stream. [`count_frames`] is
//! the one-shot form: open, read the frame count, release the handle.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::{error::FrameGifError, metadata::VideoMetadata};

/// An opened video file.
///
/// The demuxer is exclusively owned and closed when the source is dropped.
///
/// # Example
///
/// ```no_run
/// use framegif::VideoSource;
///
/// let source = VideoSource::open("input.mp4")?;
/// println!("{} frames", source.frame_count());
/// # Ok::<(), framegif::FrameGifError>(())
/// ```
pub struct VideoSource {
    pub(crate) input_context: Input,
    pub(crate) video_stream_index: usize,
    pub(crate) metadata: VideoMetadata,
    pub(crate) path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file and read the metadata of its best video stream.
    ///
    /// # Errors
    ///
    /// - [`FrameGifError::FileOpen`] if FFmpeg cannot open or probe the file.
    /// - [`FrameGifError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameGifError> {
        let path = path.as_ref().to_path_buf();

        crate::ffmpeg::initialise()?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FrameGifError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FrameGifError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| FrameGifError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count =
            VideoMetadata::resolve_frame_count(stream.frames(), duration, frames_per_second);

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec,
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames [{}]",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            video_stream_index,
            metadata,
            path,
        })
    }

    /// Cached metadata of the video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Total frame count as reported by the container (may be `0`).
    pub fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `path`, read its total frame count and release the decoder.
///
/// # Errors
///
/// Same as [`VideoSource::open`].
pub fn count_frames<P: AsRef<Path>>(path: P) -> Result<u64, FrameGifError> {
    let source = VideoSource::open(path)?;
    Ok(source.frame_count())
}
