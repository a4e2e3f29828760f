//! The end-to-end run.
//!
//! [`Pipeline`] sequences the stages: reset the working directory, count the
//! video's frames, extract sampled frames, post-process them, assemble the
//! GIF. Each stage finishes before the next starts.
//!
//! Configuration errors (such as a drop threshold at or past the end frame)
//! are logged and the stage is skipped, so later stages run against whatever
//! the directory holds. Filesystem errors end the run.

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::FrameGifError;
use crate::extract::{ExtractionReport, FrameExtractor};
use crate::gif::{GifAssembler, GifReport};
use crate::postprocess::{ImagePostProcessor, Preview};
use crate::source::count_frames;
use crate::workspace::Workspace;

/// What each stage of a run produced.
#[derive(Debug, Clone)]
#[must_use]
pub struct PipelineReport {
    /// Frame count reported by the video container.
    pub total_frames: u64,
    /// Extraction outcome, or `None` if the stage was skipped for a
    /// configuration error.
    pub extraction: Option<ExtractionReport>,
    /// Cropped sample frame, when preview is enabled.
    pub preview: Option<Preview>,
    /// Files rewritten by the batch filter pass.
    pub processed: usize,
    /// GIF assembly outcome.
    pub gif: GifReport,
}

/// Runs every stage with one [`PipelineConfig`].
///
/// # Example
///
/// ```no_run
/// use framegif::{Pipeline, PipelineConfig};
///
/// let report = Pipeline::new(PipelineConfig::default()).run()?;
/// if let Some(path) = &report.gif.path {
///     println!("GIF written to {}", path.display());
/// }
/// # Ok::<(), framegif::FrameGifError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline for `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all stages in order.
    ///
    /// # Errors
    ///
    /// - [`FrameGifError::WorkspaceMissing`] if the working directory does
    ///   not exist when it is reset.
    /// - [`FrameGifError::FileOpen`] / [`FrameGifError::NoVideoStream`] if
    ///   the video cannot be read.
    /// - I/O and image errors from post-processing or GIF assembly.
    pub fn run(&self) -> Result<PipelineReport, FrameGifError> {
        let config = &self.config;

        Workspace::new(&config.workspace).reset()?;

        let total_frames = count_frames(&config.video_path)?;
        log::info!(
            "{} reports {} frames",
            config.video_path.display(),
            total_frames
        );

        let extractor = FrameExtractor::new(&config.workspace)
            .with_drop_threshold(config.drop_threshold)
            .with_end_frame(Some(config.end_frame.unwrap_or(total_frames)))
            .with_sample_interval(config.sample_interval)
            .with_progress(Arc::clone(&config.progress));

        let extraction = match extractor.extract_file(&config.video_path) {
            Ok(report) => {
                if let Some(reason) = report.failure() {
                    log::warn!(
                        "Extraction ended early ({reason}); keeping {} frames",
                        report.frames_written()
                    );
                }
                Some(report)
            }
            Err(error) if error.is_configuration_error() => {
                log::error!("Skipping extraction: {error}");
                None
            }
            Err(error) => return Err(error),
        };

        let (preview, processed) =
            ImagePostProcessor::new(&config.workspace, config.post_process.clone())
                .with_progress(Arc::clone(&config.progress))
                .run()?;

        let gif = GifAssembler::new(&config.workspace, &config.output_dir)
            .with_options(config.gif.clone())
            .with_progress(Arc::clone(&config.progress))
            .assemble()?;

        Ok(PipelineReport {
            total_frames,
            extraction,
            preview,
            processed,
            gif,
        })
    }
}
