//! Video metadata types.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for the lifetime of the source.

use std::time::Duration;

/// Metadata for the best video stream of a file.
///
/// # Example
///
/// ```no_run
/// use framegif::VideoSource;
///
/// let source = VideoSource::open("input.mp4")?;
/// let metadata = source.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// # Ok::<(), framegif::FrameGifError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames as reported by the container.
    ///
    /// Taken from the stream's declared frame count when present, otherwise
    /// estimated from duration and frame rate. May be `0` or inaccurate for
    /// containers without exact metadata.
    pub frame_count: u64,
    /// Container-level duration.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Pick the frame count the way the decoder reports it.
    ///
    /// `declared` is the stream's `nb_frames` field. When the container does
    /// not fill it in, fall back to `duration × fps`.
    pub(crate) fn resolve_frame_count(
        declared: i64,
        duration: Duration,
        frames_per_second: f64,
    ) -> u64 {
        if declared > 0 {
            declared as u64
        } else if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        }
    }
}
