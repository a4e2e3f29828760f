//! # framegif
//!
//! Turn a video into an animated GIF: sample frames from it, optionally
//! filter and crop them, and encode the result.
//!
//! Decoding goes through FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, image work
//! through [`image`], and encoding through [`gif`](https://crates.io/crates/gif).
//!
//! ## Quick Start
//!
//! ### Run the whole pipeline
//!
//! ```no_run
//! use framegif::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::new()
//!     .with_video_path("input.mp4")
//!     .with_workspace("frames")
//!     .with_output_dir("result");
//! let report = Pipeline::new(config).run()?;
//! println!("{:?}", report.gif.path);
//! # Ok::<(), framegif::FrameGifError>(())
//! ```
//!
//! ### Drive the stages yourself
//!
//! ```no_run
//! use framegif::{
//!     FrameExtractor, GifAssembler, ImagePostProcessor, PostProcessOptions, Workspace,
//! };
//!
//! let workspace = Workspace::new("frames");
//! workspace.reset()?;
//!
//! let report = FrameExtractor::new(workspace.path())
//!     .with_drop_threshold(10)
//!     .extract_file("input.mp4")?;
//! println!("{} frames written", report.frames_written());
//!
//! ImagePostProcessor::new(workspace.path(), PostProcessOptions::default()).process_all()?;
//! GifAssembler::new(workspace.path(), "result").assemble()?;
//! # Ok::<(), framegif::FrameGifError>(())
//! ```
//!
//! ## Stages
//!
//! | Stage | Type |
//! |-------|------|
//! | Reset the working directory | [`Workspace::reset`] |
//! | Count frames | [`count_frames`], [`VideoSource`] |
//! | Extract every Nth frame after a drop threshold | [`FrameExtractor`], [`FrameSampler`] |
//! | Filter and crop in place | [`ImagePostProcessor`] |
//! | Encode a timestamped GIF | [`GifAssembler`] |
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | Filter and crop frames on the rayon thread pool |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod gif;
pub mod metadata;
pub mod pipeline;
pub mod postprocess;
pub mod progress;
pub mod sampling;
pub mod source;
mod utilities;
pub mod workspace;

pub use config::{CropRect, PipelineConfig};
pub use error::FrameGifError;
pub use extract::{ExtractionReport, FrameExtractor};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use self::gif::{GifAssembler, GifOptions, GifReport, encode_gif, output_file_name};
pub use metadata::VideoMetadata;
pub use pipeline::{Pipeline, PipelineReport};
pub use postprocess::{FilterKind, ImagePostProcessor, PostProcessOptions, Preview};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use sampling::{FrameSampler, SampleDecision, StopReason};
pub use source::{VideoSource, count_frames};
pub use workspace::{Workspace, natural_file_order};
