//! Progress reporting.
//!
//! Long-running stages report [`ProgressInfo`] snapshots to a
//! [`ProgressCallback`]. Callbacks observe only; they cannot stop a stage.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framegif::{PipelineConfig, Pipeline, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {} / {:?}", info.operation, info.current, info.total);
//!     }
//! }
//!
//! let config = PipelineConfig::default().with_progress(Arc::new(PrintProgress));
//! Pipeline::new(config).run()?;
//! # Ok::<(), framegif::FrameGifError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The stage currently reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding the video and writing sampled frames.
    FrameExtraction,
    /// Filtering and cropping frames in the working directory.
    PostProcessing,
    /// Loading frames and encoding the GIF.
    GifAssembly,
}

/// A snapshot of stage progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which stage is reporting.
    pub operation: OperationType,
    /// Items processed so far (decoded frames, files, GIF frames).
    pub current: u64,
    /// Items expected, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the stage started.
    pub elapsed: Duration,
}

/// Receives progress updates.
pub trait ProgressCallback: Send + Sync {
    /// Called once per batch of work items, and once more when the stage
    /// ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Counts work items for one stage and forwards a snapshot to the callback
/// every `batch_size` items.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total: total.filter(|&t| t > 0),
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed item, notifying once the batch is full.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    /// Report whatever the last partial batch left unreported.
    pub(crate) fn finish(&mut self) {
        if self.items_since_last_report > 0 {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    fn report(&self) {
        let percentage = self
            .total
            .map(|total| (self.current.min(total) as f32 / total as f32) * 100.0);

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u64, Option<f32>)>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push((info.current, info.percentage));
        }
    }

    #[test]
    fn tracker_reports_each_item() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker =
            ProgressTracker::new(recorder.clone(), OperationType::PostProcessing, Some(4), 1);
        for _ in 0..4 {
            tracker.advance();
        }
        tracker.finish();
        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[1], (2, Some(50.0)));
        assert_eq!(seen[3], (4, Some(100.0)));
    }

    #[test]
    fn zero_total_is_unknown() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker =
            ProgressTracker::new(recorder.clone(), OperationType::FrameExtraction, Some(0), 1);
        tracker.advance();
        assert_eq!(recorder.0.lock().unwrap()[0], (1, None));
    }

    #[test]
    fn batches_throttle_callbacks() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker =
            ProgressTracker::new(recorder.clone(), OperationType::FrameExtraction, Some(25), 10);
        for _ in 0..25 {
            tracker.advance();
        }
        assert_eq!(recorder.0.lock().unwrap().len(), 2);

        tracker.finish();
        tracker.finish();
        let seen = recorder.0.lock().unwrap();
        let counts: Vec<u64> = seen.iter().map(|(current, _)| *current).collect();
        assert_eq!(counts, [10, 20, 25]);
        assert_eq!(seen[2].1, Some(100.0));
    }
}
