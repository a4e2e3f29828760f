//! Sequential frame extraction.
//!
//! [`FrameExtractor`] decodes a video from the first frame onwards, applies
//! the [`FrameSampler`] policy to each decoded frame and writes the kept ones
//! into a directory as `0_frame.png`, `1_frame.png`, … in write order. File
//! numbering is independent of the decoder position of the frame.
//!
//! A failure in the middle of decoding does not discard earlier output: it is
//! recorded in the returned [`ExtractionReport`] as [`StopReason::Failed`],
//! next to the list of files already written.
//!
//! # Example
//!
//! ```no_run
//! use framegif::{FrameExtractor, StopReason};
//!
//! let report = FrameExtractor::new("./assets/image")
//!     .with_drop_threshold(10)
//!     .with_end_frame(Some(100))
//!     .extract_file("input.mp4")?;
//!
//! println!("wrote {} frames", report.frames_written());
//! if let StopReason::Failed(reason) = &report.stop_reason {
//!     eprintln!("stopped early: {reason}");
//! }
//! # Ok::<(), framegif::FrameGifError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::FrameGifError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::sampling::{DEFAULT_SAMPLE_INTERVAL, FrameSampler, SampleDecision, StopReason};
use crate::source::VideoSource;
use crate::utilities::{frame_file_name, frame_to_buffer};

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ExtractionReport {
    /// Frames pulled out of the decoder, including dropped and skipped ones.
    pub frames_decoded: u64,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
    /// Frames the sampling policy would write for a stream of the reported
    /// length.
    pub expected_frames: u64,
    /// Why decoding ended.
    pub stop_reason: StopReason,
}

impl ExtractionReport {
    /// Number of frame files written.
    pub fn frames_written(&self) -> usize {
        self.written.len()
    }

    /// `true` unless decoding ended with an error.
    pub fn is_complete(&self) -> bool {
        !matches!(self.stop_reason, StopReason::Failed(_))
    }

    /// The error message if decoding ended early.
    pub fn failure(&self) -> Option<&str> {
        match &self.stop_reason {
            StopReason::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Decodes a video and writes sampled frames into a directory.
#[derive(Clone)]
pub struct FrameExtractor {
    destination: PathBuf,
    drop_threshold: u64,
    end_frame: Option<u64>,
    sample_interval: u64,
    batch_size: u64,
    progress: Arc<dyn ProgressCallback>,
}

/// Decoded frames per progress notification unless overridden.
pub const DEFAULT_PROGRESS_BATCH: u64 = 10;

impl std::fmt::Debug for FrameExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameExtractor")
            .field("destination", &self.destination)
            .field("drop_threshold", &self.drop_threshold)
            .field("end_frame", &self.end_frame)
            .field("sample_interval", &self.sample_interval)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl FrameExtractor {
    /// Write frames into `destination`, which must already exist.
    ///
    /// Defaults: drop nothing, stop at the video's total frame count, keep
    /// every 3rd frame.
    pub fn new<P: AsRef<Path>>(destination: P) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
            drop_threshold: 0,
            end_frame: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            batch_size: DEFAULT_PROGRESS_BATCH,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Discard frames at positions `1..=frames`.
    #[must_use]
    pub fn with_drop_threshold(mut self, frames: u64) -> Self {
        self.drop_threshold = frames;
        self
    }

    /// Stop after this position. `None` uses the video's total frame count.
    #[must_use]
    pub fn with_end_frame(mut self, end_frame: Option<u64>) -> Self {
        self.end_frame = end_frame;
        self
    }

    /// Keep one frame in every `interval`.
    #[must_use]
    pub fn with_sample_interval(mut self, interval: u64) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Report decoding progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Notify the progress callback every `frames` decoded frames (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, frames: u64) -> Self {
        self.batch_size = frames;
        self
    }

    /// Open `path` and extract from it. The decoder is released on return.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionReport, FrameGifError> {
        let mut source = VideoSource::open(path)?;
        self.extract(&mut source)
    }

    /// Extract sampled frames from an opened source.
    ///
    /// # Errors
    ///
    /// Returned before any decoding:
    ///
    /// - [`FrameGifError::InvalidRange`] if the drop threshold is not below
    ///   the end frame. Nothing is written.
    /// - [`FrameGifError::InvalidInterval`] for a zero interval.
    /// - [`FrameGifError::WorkspaceMissing`] if the destination is not a
    ///   directory.
    ///
    /// Errors once decoding has started end up in
    /// [`ExtractionReport::stop_reason`] instead.
    pub fn extract(&self, source: &mut VideoSource) -> Result<ExtractionReport, FrameGifError> {
        let total_frames = source.frame_count();
        let end_frame = self.end_frame.unwrap_or(total_frames);
        let sampler = FrameSampler::new(
            self.drop_threshold,
            end_frame,
            self.sample_interval,
            total_frames,
        )?;

        if !self.destination.is_dir() {
            return Err(FrameGifError::WorkspaceMissing(self.destination.clone()));
        }

        log::info!(
            "Extracting from {} into {}: drop <= {}, stop at {}, keep 1 in {} (expect {} frames)",
            source.path().display(),
            self.destination.display(),
            sampler.drop_threshold(),
            sampler.last_position(),
            sampler.interval(),
            sampler.expected_frames(),
        );

        let tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::FrameExtraction,
            Some(sampler.last_position()),
            self.batch_size,
        );
        let mut writer = FrameWriter {
            sampler,
            destination: &self.destination,
            position: 0,
            written: Vec::new(),
            rgb_frame: VideoFrame::empty(),
            tracker,
        };

        let stop_reason = match decode_into(source, &mut writer) {
            Ok(reason) => reason,
            Err(error) => {
                log::error!(
                    "Extraction stopped at frame {} after writing {} frames: {error}",
                    writer.position,
                    writer.written.len(),
                );
                StopReason::Failed(error.to_string())
            }
        };
        writer.tracker.finish();

        log::debug!(
            "Decoded {} frames, wrote {} ({:?})",
            writer.position,
            writer.written.len(),
            stop_reason,
        );

        Ok(ExtractionReport {
            frames_decoded: writer.position,
            written: writer.written,
            expected_frames: sampler.expected_frames(),
            stop_reason,
        })
    }
}

/// Per-run state: running position, output files and the RGB scratch frame.
struct FrameWriter<'a> {
    sampler: FrameSampler,
    destination: &'a Path,
    position: u64,
    written: Vec<PathBuf>,
    rgb_frame: VideoFrame,
    tracker: ProgressTracker,
}

impl FrameWriter<'_> {
    /// Handle one decoded frame. Returns the stop reason once a bound is hit.
    fn accept(
        &mut self,
        decoded: &VideoFrame,
        scaler: &mut ScalingContext,
    ) -> Result<Option<StopReason>, FrameGifError> {
        self.position += 1;

        if self.sampler.decide(self.position) == SampleDecision::Keep {
            scaler.run(decoded, &mut self.rgb_frame)?;
            let width = self.rgb_frame.width();
            let height = self.rgb_frame.height();
            let buffer = frame_to_buffer(&self.rgb_frame, width, height, 3);
            let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
                FrameGifError::VideoDecodeError(format!(
                    "Failed to construct RGB image for frame {}",
                    self.position
                ))
            })?;

            let path = self
                .destination
                .join(frame_file_name(self.written.len() as u64));
            image.save(&path)?;
            log::trace!("Frame {} -> {}", self.position, path.display());
            self.written.push(path);
        }

        self.tracker.advance();
        Ok(self.sampler.stop_after(self.position))
    }
}

/// Decode `source` from the start, feeding every frame to `writer`.
fn decode_into(
    source: &mut VideoSource,
    writer: &mut FrameWriter<'_>,
) -> Result<StopReason, FrameGifError> {
    let video_stream_index = source.video_stream_index;
    let stream = source
        .input_context
        .stream(video_stream_index)
        .ok_or(FrameGifError::NoVideoStream)?;
    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().video()?;

    let mut scaler = ScalingContext::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        ScalingFlags::BILINEAR,
    )?;

    let mut decoded_frame = VideoFrame::empty();

    for (stream, packet) in source.input_context.packets() {
        if stream.index() != video_stream_index {
            continue;
        }

        decoder.send_packet(&packet)?;

        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if let Some(reason) = writer.accept(&decoded_frame, &mut scaler)? {
                return Ok(reason);
            }
        }
    }

    // Flush frames still buffered in the decoder.
    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded_frame).is_ok() {
        if let Some(reason) = writer.accept(&decoded_frame, &mut scaler)? {
            return Ok(reason);
        }
    }

    Ok(StopReason::EndOfStream)
}
