//! Filtering and cropping extracted frames.
//!
//! [`ImagePostProcessor`] runs two independent passes over a working
//! directory:
//!
//! - a **preview** of one sample frame: its size is logged and a cropped
//!   copy is handed back, nothing is written;
//! - a **batch** pass that applies a 3×3 [`FilterKind`] kernel and a
//!   [`CropRect`] to every file, overwriting it in place.
//!
//! # Example
//!
//! ```no_run
//! use framegif::{FilterKind, ImagePostProcessor, PostProcessOptions};
//!
//! let options = PostProcessOptions::default().filter(FilterKind::Detail);
//! let processed = ImagePostProcessor::new("./assets/image", options).process_all()?;
//! println!("processed {processed} frames");
//! # Ok::<(), framegif::FrameGifError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use image::{DynamicImage, GenericImage, GenericImageView, imageops};

use crate::config::CropRect;
use crate::error::FrameGifError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::utilities::frame_file_name;
use crate::workspace::Workspace;

/// A 3×3 convolution kernel applied before cropping.
///
/// Kernels are normalised by the sum of their weights (a zero sum is treated
/// as 1), the same convention as the classic image-editor filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterKind {
    /// Mild detail enhancement. The default.
    #[default]
    Detail,
    /// Stronger sharpening.
    Sharpen,
    /// Light smoothing.
    Smooth,
    /// Edge enhancement.
    EdgeEnhance,
    /// Aggressive edge enhancement.
    EdgeEnhanceMore,
    /// Edge detection; flat areas become black.
    FindEdges,
}

impl FilterKind {
    /// All kernels, in declaration order.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Detail,
        FilterKind::Sharpen,
        FilterKind::Smooth,
        FilterKind::EdgeEnhance,
        FilterKind::EdgeEnhanceMore,
        FilterKind::FindEdges,
    ];

    /// Row-major kernel weights.
    pub fn kernel(self) -> [f32; 9] {
        match self {
            FilterKind::Detail => [0.0, -1.0, 0.0, -1.0, 10.0, -1.0, 0.0, -1.0, 0.0],
            FilterKind::Sharpen => [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0],
            FilterKind::Smooth => [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0],
            FilterKind::EdgeEnhance => [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0],
            FilterKind::EdgeEnhanceMore => [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0],
            FilterKind::FindEdges => [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Detail => "detail",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Smooth => "smooth",
            FilterKind::EdgeEnhance => "edge-enhance",
            FilterKind::EdgeEnhanceMore => "edge-enhance-more",
            FilterKind::FindEdges => "find-edges",
        }
    }

    /// Apply the kernel. `image` divides by the kernel sum itself.
    ///
    /// Border pixels see their nearest edge pixel in place of the missing
    /// neighbours, so the output keeps the input's size with no blank ring.
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }
        replicate_border(image)
            .filter3x3(&self.kernel())
            .crop_imm(1, 1, width, height)
    }
}

/// Copy of `image` grown by one pixel on each side, the new ring filled from
/// the nearest edge pixel.
fn replicate_border(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    let mut padded = DynamicImage::new(width + 2, height + 2, image.color());
    imageops::replace(&mut padded, image, 1, 1);

    let source = |x: u32, y: u32| {
        image.get_pixel(
            x.saturating_sub(1).min(width - 1),
            y.saturating_sub(1).min(height - 1),
        )
    };
    for x in 0..width + 2 {
        padded.put_pixel(x, 0, source(x, 0));
        padded.put_pixel(x, height + 1, source(x, height + 1));
    }
    for y in 1..height + 1 {
        padded.put_pixel(0, y, source(0, y));
        padded.put_pixel(width + 1, y, source(width + 1, y));
    }
    padded
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FrameGifError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('_', "-");
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalised)
            .ok_or_else(|| FrameGifError::UnknownFilter(value.to_string()))
    }
}

/// Settings for [`ImagePostProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessOptions {
    /// Log and return a cropped preview of the sample frame.
    pub preview: bool,
    /// Run the batch filter + crop pass.
    pub enabled: bool,
    /// Kernel used by the batch pass.
    pub filter: FilterKind,
    /// Crop rectangle used by both passes.
    pub crop: CropRect,
    /// Write-order index of the preview sample (`0` → `0_frame.png`).
    pub preview_frame: u64,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            preview: false,
            enabled: true,
            filter: FilterKind::Detail,
            crop: CropRect::default(),
            preview_frame: 0,
        }
    }
}

impl PostProcessOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the preview.
    pub fn preview(mut self, enabled: bool) -> Self {
        self.preview = enabled;
        self
    }

    /// Toggle the batch pass.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the kernel.
    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }

    /// Set the crop rectangle.
    pub fn crop(mut self, crop: CropRect) -> Self {
        self.crop = crop;
        self
    }

    /// Pick which frame the preview opens.
    pub fn preview_frame(mut self, index: u64) -> Self {
        self.preview_frame = index;
        self
    }
}

/// A cropped sample frame and the size it had before cropping.
#[derive(Debug, Clone)]
pub struct Preview {
    /// File the sample was read from.
    pub source: PathBuf,
    /// `(width, height)` before cropping.
    pub original_dimensions: (u32, u32),
    /// The cropped image.
    pub image: DynamicImage,
}

/// Filters and crops frames in a working directory.
#[derive(Clone)]
pub struct ImagePostProcessor {
    workspace: Workspace,
    options: PostProcessOptions,
    progress: Arc<dyn ProgressCallback>,
}

impl std::fmt::Debug for ImagePostProcessor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ImagePostProcessor")
            .field("workspace", &self.workspace)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ImagePostProcessor {
    /// Create a processor for the frames in `directory`.
    pub fn new<P: AsRef<Path>>(directory: P, options: PostProcessOptions) -> Self {
        Self {
            workspace: Workspace::new(directory),
            options,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Report each processed file to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Run whichever passes the options enable.
    ///
    /// Returns the preview (if enabled) and the number of files the batch
    /// pass rewrote (`0` when disabled).
    pub fn run(&self) -> Result<(Option<Preview>, usize), FrameGifError> {
        let preview = if self.options.preview {
            Some(self.preview()?)
        } else {
            None
        };
        let processed = if self.options.enabled {
            self.process_all()?
        } else {
            log::debug!("Batch filter disabled; frames left untouched");
            0
        };
        Ok((preview, processed))
    }

    /// Open the sample frame, log its size and return it cropped.
    ///
    /// # Errors
    ///
    /// Fails if the sample frame does not exist or cannot be decoded.
    pub fn preview(&self) -> Result<Preview, FrameGifError> {
        let source = self
            .workspace
            .path()
            .join(frame_file_name(self.options.preview_frame));
        let image = image::open(&source)?;
        let original_dimensions = image.dimensions();
        log::info!(
            "Preview {}: {}x{}",
            source.display(),
            original_dimensions.0,
            original_dimensions.1,
        );

        let image = crop(&image, self.options.crop);
        log::info!(
            "Preview cropped to {} -> {}x{}",
            self.options.crop,
            image.width(),
            image.height(),
        );

        Ok(Preview {
            source,
            original_dimensions,
            image,
        })
    }

    /// Filter, crop and overwrite every file in the directory.
    ///
    /// The set of file names is unchanged. Returns how many files were
    /// rewritten.
    pub fn process_all(&self) -> Result<usize, FrameGifError> {
        let paths = self.workspace.frame_paths()?;
        log::info!(
            "Applying {} filter and {} crop to {} frames",
            self.options.filter,
            self.options.crop,
            paths.len(),
        );

        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::PostProcessing,
            Some(paths.len() as u64),
            1,
        );

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            paths
                .par_iter()
                .try_for_each(|path| self.process_file(path))?;
            for _ in &paths {
                tracker.advance();
            }
        }

        #[cfg(not(feature = "rayon"))]
        for path in &paths {
            self.process_file(path)?;
            tracker.advance();
        }

        Ok(paths.len())
    }

    /// Filter, crop and overwrite a single file.
    pub fn process_file(&self, path: &Path) -> Result<(), FrameGifError> {
        let image = image::open(path)?;
        let filtered = self.options.filter.apply(&image);
        let cropped = crop(&filtered, self.options.crop);
        cropped.save(path)?;
        log::trace!("Processed {}", path.display());
        Ok(())
    }
}

/// Crop, clipping the rectangle to the image bounds.
fn crop(image: &DynamicImage, rect: CropRect) -> DynamicImage {
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}
