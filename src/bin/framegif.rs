use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegif::{
    CropRect, ExtractionReport, FfmpegLogLevel, FilterKind, FrameExtractor, GifAssembler,
    GifOptions, GifReport, ImagePostProcessor, Pipeline, PipelineConfig, PostProcessOptions,
    ProgressCallback, ProgressInfo, StopReason, VideoSource, Workspace,
    config::{DEFAULT_DROP_THRESHOLD, DEFAULT_OUTPUT_DIR, DEFAULT_VIDEO_PATH, DEFAULT_WORKSPACE},
    sampling::DEFAULT_SAMPLE_INTERVAL,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use tracing_subscriber::filter::LevelFilter;

const CLI_AFTER_HELP: &str = "Examples:\n  framegif run --init\n  framegif run --video clip.mp4 --drop 30 --end 300 --filter sharpen --crop 320x240 --progress\n  framegif count clip.mp4 --json\n  framegif gif --workdir frames --fps 15\n  framegif completions zsh > _framegif";

#[derive(Debug, Parser)]
#[command(
    name = "framegif",
    version,
    about = "Sample frames from a video, filter and crop them, and encode an animated GIF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<FfmpegLogLevel>,
}

#[derive(Debug, Args, Clone)]
struct SamplingArgs {
    /// Discard frames at positions 1..=N.
    #[arg(long = "drop", default_value_t = DEFAULT_DROP_THRESHOLD)]
    drop_threshold: u64,
    /// Stop at this frame position (default: the video's frame count).
    #[arg(long = "end")]
    end_frame: Option<u64>,
    /// Keep one frame in every N.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_INTERVAL)]
    interval: u64,
}

#[derive(Debug, Args, Clone)]
struct FilterArgs {
    /// Convolution filter (detail, sharpen, smooth, edge-enhance, edge-enhance-more, find-edges).
    #[arg(long, default_value = "detail")]
    filter: FilterKind,
    /// Crop geometry, WxH or WxH+X+Y.
    #[arg(long, default_value = "504x540")]
    crop: CropRect,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reset, extract, post-process and encode in one go.
    #[command(
        about = "Run the full pipeline",
        after_help = "Examples:\n  framegif run --init\n  framegif run --video clip.mp4 --no-filter --fps 10 --json"
    )]
    Run {
        /// Input video.
        #[arg(long, default_value = DEFAULT_VIDEO_PATH)]
        video: PathBuf,
        /// Working directory for extracted frames.
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workdir: PathBuf,
        /// Directory the GIF is written into.
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Skip the filter + crop pass.
        #[arg(long)]
        no_filter: bool,
        /// Log the size of the first frame and its cropped size.
        #[arg(long)]
        preview: bool,
        /// GIF frame rate.
        #[arg(long, default_value_t = 12.0)]
        fps: f64,
        /// Create the working directory first if it does not exist.
        #[arg(long)]
        init: bool,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the frame count of a video.
    #[command(about = "Count video frames", visible_alias = "probe")]
    Count {
        /// Input video.
        input: PathBuf,
        /// Output as JSON, with the rest of the stream metadata.
        #[arg(long)]
        json: bool,
    },

    /// Extract sampled frames into an existing directory.
    #[command(about = "Extract frames")]
    Extract {
        /// Input video.
        input: PathBuf,
        /// Destination directory (must exist).
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workdir: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
    },

    /// Filter and crop every frame in place.
    #[command(about = "Filter and crop frames")]
    Postprocess {
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workdir: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Write a cropped copy of one frame for inspection.
    #[command(about = "Preview the crop on one frame")]
    Preview {
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workdir: PathBuf,
        /// Where to write the cropped image.
        #[arg(long)]
        out: PathBuf,
        /// Frame index to preview.
        #[arg(long, default_value_t = 0)]
        frame: u64,
        #[arg(long, default_value = "504x540")]
        crop: CropRect,
    },

    /// Encode the frames in a directory as a timestamped GIF.
    #[command(about = "Assemble the GIF")]
    Gif {
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workdir: PathBuf,
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[arg(long, default_value_t = 12.0)]
        fps: f64,
        /// Repeat count (default: loop forever).
        #[arg(long)]
        repeat: Option<u16>,
    },

    /// Empty the working directory.
    #[command(about = "Reset the working directory")]
    Reset {
        #[arg(long, default_value = DEFAULT_WORKSPACE)]
        workdir: PathBuf,
        /// Create the directory if it does not exist.
        #[arg(long)]
        create: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Draws one indicatif bar per stage, swapping it when the stage changes.
struct TerminalProgress {
    bar: Mutex<Option<(framegif::OperationType, ProgressBar)>>,
}

impl TerminalProgress {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn new_bar(operation: framegif::OperationType, total: Option<u64>) -> ProgressBar {
        let bar = match total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {msg:<16} {bar:40.cyan/blue} {pos}/{len}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(format!("{operation:?}"));
        bar
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let stale = slot
            .as_ref()
            .is_none_or(|(operation, _)| *operation != info.operation);
        if stale {
            if let Some((_, bar)) = slot.take() {
                bar.finish();
            }
            *slot = Some((info.operation, Self::new_bar(info.operation, info.total)));
        }
        if let Some((_, bar)) = slot.as_ref() {
            bar.set_position(info.current);
        }
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some((_, bar)) = slot.take() {
                bar.finish();
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn warn(message: String) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

fn success(message: String) {
    println!("{} {}", "success:".green().bold(), message.green());
}

fn stop_reason_label(reason: &StopReason) -> String {
    match reason {
        StopReason::EndBound => "end-frame".to_string(),
        StopReason::TotalFrames => "total-frames".to_string(),
        StopReason::EndOfStream => "end-of-stream".to_string(),
        StopReason::Failed(reason) => format!("failed: {reason}"),
    }
}

fn extraction_json(report: &ExtractionReport) -> Value {
    json!({
        "frames_decoded": report.frames_decoded,
        "frames_written": report.frames_written(),
        "expected_frames": report.expected_frames,
        "stop_reason": stop_reason_label(&report.stop_reason),
        "complete": report.is_complete(),
    })
}

fn gif_json(report: &GifReport) -> Value {
    json!({
        "path": report.path.as_ref().map(|path| path.display().to_string()),
        "frames": report.frame_count,
    })
}

fn print_extraction(report: &ExtractionReport, directory: &Path) {
    if let Some(reason) = report.failure() {
        warn(format!(
            "extraction stopped early after {} frames: {reason}",
            report.frames_decoded
        ));
    }
    success(format!(
        "Extracted {} frame(s) to {} ({})",
        report.frames_written(),
        directory.display(),
        stop_reason_label(&report.stop_reason),
    ));
}

fn print_gif(report: &GifReport) {
    match &report.path {
        Some(path) => success(format!(
            "Encoded {} frame(s) to {}",
            report.frame_count,
            path.display()
        )),
        None => warn("no frames to encode; no GIF written".to_string()),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    if let Some(level) = cli.global.log_level {
        framegif::set_ffmpeg_log_level(level);
    }

    match cli.command {
        Commands::Run {
            video,
            workdir,
            output_dir,
            sampling,
            filter,
            no_filter,
            preview,
            fps,
            init,
            progress,
            json,
        } => {
            let workspace = Workspace::new(&workdir);
            if init && !workdir.exists() {
                workspace.create()?;
                warn(format!("created working directory {}", workdir.display()));
            }

            let mut config = PipelineConfig::new()
                .with_video_path(&video)
                .with_workspace(&workdir)
                .with_output_dir(&output_dir)
                .with_drop_threshold(sampling.drop_threshold)
                .with_end_frame(sampling.end_frame)
                .with_sample_interval(sampling.interval)
                .with_filter(filter.filter)
                .with_crop(filter.crop)
                .with_batch_filter(!no_filter)
                .with_preview(preview)
                .with_fps(fps);
            if progress {
                config = config.with_progress(Arc::new(TerminalProgress::new()));
            }

            let report = Pipeline::new(config).run()?;

            if json {
                let payload = json!({
                    "total_frames": report.total_frames,
                    "extraction": report.extraction.as_ref().map(extraction_json),
                    "preview": report.preview.as_ref().map(|preview| json!({
                        "source": preview.source.display().to_string(),
                        "width": preview.original_dimensions.0,
                        "height": preview.original_dimensions.1,
                    })),
                    "processed": report.processed,
                    "gif": gif_json(&report.gif),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                match &report.extraction {
                    Some(extraction) => print_extraction(extraction, &workdir),
                    None => warn("extraction skipped (see log)".to_string()),
                }
                if report.processed > 0 {
                    success(format!("Post-processed {} frame(s)", report.processed));
                }
                print_gif(&report.gif);
            }
        }
        Commands::Count { input, json } => {
            let source = VideoSource::open(&input)?;
            let metadata = source.metadata();
            if json {
                let payload = json!({
                    "frame_count": metadata.frame_count,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", metadata.frame_count);
            }
        }
        Commands::Extract {
            input,
            workdir,
            sampling,
            progress,
        } => {
            let mut extractor = FrameExtractor::new(&workdir)
                .with_drop_threshold(sampling.drop_threshold)
                .with_end_frame(sampling.end_frame)
                .with_sample_interval(sampling.interval);
            if progress {
                extractor = extractor.with_progress(Arc::new(TerminalProgress::new()));
            }
            let report = extractor.extract_file(&input)?;
            print_extraction(&report, &workdir);
        }
        Commands::Postprocess { workdir, filter } => {
            let options = PostProcessOptions::new()
                .filter(filter.filter)
                .crop(filter.crop);
            let processed = ImagePostProcessor::new(&workdir, options).process_all()?;
            success(format!(
                "Applied {} filter and {} crop to {processed} frame(s)",
                filter.filter, filter.crop
            ));
        }
        Commands::Preview {
            workdir,
            out,
            frame,
            crop,
        } => {
            let options = PostProcessOptions::new().preview_frame(frame).crop(crop);
            let preview = ImagePostProcessor::new(&workdir, options).preview()?;
            preview.image.save(&out)?;
            println!(
                "{}: {}x{} -> {}x{}",
                preview.source.display(),
                preview.original_dimensions.0,
                preview.original_dimensions.1,
                preview.image.width(),
                preview.image.height(),
            );
            success(format!("Preview written to {}", out.display()));
        }
        Commands::Gif {
            workdir,
            output_dir,
            fps,
            repeat,
        } => {
            let options = GifOptions::new().fps(fps).repeat(repeat);
            let report = GifAssembler::new(&workdir, &output_dir)
                .with_options(options)
                .assemble()?;
            print_gif(&report);
        }
        Commands::Reset { workdir, create } => {
            let workspace = Workspace::new(&workdir);
            if create && !workdir.exists() {
                workspace.create()?;
            } else {
                workspace.reset()?;
            }
            success(format!("Working directory {} is empty", workdir.display()));
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegif", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn run_defaults_match_stock_pipeline() {
        let cli = Cli::try_parse_from(["framegif", "run"]).unwrap();
        let Commands::Run {
            video,
            workdir,
            sampling,
            filter,
            fps,
            no_filter,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(video.to_str(), Some("./assets/movie/Test01.mp4"));
        assert_eq!(workdir.to_str(), Some("./assets/image"));
        assert_eq!(sampling.drop_threshold, 10);
        assert_eq!(sampling.end_frame, None);
        assert_eq!(sampling.interval, 3);
        assert_eq!(filter.crop.to_string(), "504x540+0+0");
        assert_eq!(filter.filter.name(), "detail");
        assert_eq!(fps, 12.0);
        assert!(!no_filter);
    }

    #[test]
    fn rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["framegif", "postprocess", "--filter", "emboss"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["framegif", "count", "a.mp4", "--verbose", "--log-level", "quiet"])
                .unwrap();
        assert!(cli.global.verbose);
        assert!(cli.global.log_level.is_some());
    }
}
