//! Frame sampling policy.
//!
//! [`FrameSampler`] decides, for every decoded frame, whether it is dropped,
//! skipped or written, and when decoding should stop. It holds no decoder
//! state so the policy can be checked without a video file.
//!
//! Positions are 1-based: the first decoded frame is position 1.
//!
//! # Example
//!
//! ```
//! use framegif::{FrameSampler, SampleDecision};
//!
//! // Drop the first 10 frames, stop at 100, keep every 3rd frame.
//! let sampler = FrameSampler::new(10, 100, 3, 100)?;
//! assert_eq!(sampler.decide(9), SampleDecision::Drop);
//! assert_eq!(sampler.decide(11), SampleDecision::Skip);
//! assert_eq!(sampler.decide(12), SampleDecision::Keep);
//! assert_eq!(sampler.expected_frames(), 30);
//! # Ok::<(), framegif::FrameGifError>(())
//! ```

use crate::error::FrameGifError;

/// Default keep-one-in-N sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: u64 = 3;

/// What to do with the frame at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDecision {
    /// At or below the drop threshold; discarded.
    Drop,
    /// Past the threshold but not on the sampling grid.
    Skip,
    /// Written to disk.
    Keep,
}

/// Why extraction stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The running position reached the configured end frame.
    EndBound,
    /// The running position reached the container's total frame count.
    TotalFrames,
    /// The decoder ran out of frames first.
    EndOfStream,
    /// Decoding or writing failed; frames written before the failure remain.
    Failed(String),
}

/// Drop / sample / stop policy for one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    drop_threshold: u64,
    end_frame: u64,
    interval: u64,
    total_frames: u64,
}

impl FrameSampler {
    /// Build a sampler.
    ///
    /// `total_frames` of `0` means the container did not report a count; the
    /// end frame (or end of stream) then bounds extraction alone.
    ///
    /// # Errors
    ///
    /// - [`FrameGifError::InvalidRange`] if `drop_threshold >= end_frame`.
    /// - [`FrameGifError::InvalidInterval`] if `interval == 0`.
    pub fn new(
        drop_threshold: u64,
        end_frame: u64,
        interval: u64,
        total_frames: u64,
    ) -> Result<Self, FrameGifError> {
        if drop_threshold >= end_frame {
            return Err(FrameGifError::InvalidRange {
                drop_threshold,
                end_frame,
            });
        }
        if interval == 0 {
            return Err(FrameGifError::InvalidInterval);
        }
        Ok(Self {
            drop_threshold,
            end_frame,
            interval,
            total_frames,
        })
    }

    /// Classify the frame at 1-based `position`.
    pub fn decide(&self, position: u64) -> SampleDecision {
        if position <= self.drop_threshold {
            SampleDecision::Drop
        } else if position % self.interval == 0 {
            SampleDecision::Keep
        } else {
            SampleDecision::Skip
        }
    }

    /// Whether decoding stops after the frame at `position` has been handled.
    ///
    /// The total frame count is checked first, matching the order in which
    /// the bounds are usually hit for a full-length run.
    pub fn stop_after(&self, position: u64) -> Option<StopReason> {
        if self.total_frames > 0 && position == self.total_frames {
            Some(StopReason::TotalFrames)
        } else if position == self.end_frame {
            Some(StopReason::EndBound)
        } else {
            None
        }
    }

    /// Last position that can be decoded before a stop condition.
    pub fn last_position(&self) -> u64 {
        if self.total_frames > 0 {
            self.end_frame.min(self.total_frames)
        } else {
            self.end_frame
        }
    }

    /// Number of frames this policy writes when the stream is at least
    /// [`last_position`](Self::last_position) frames long.
    ///
    /// Counts the multiples of the interval in `(drop_threshold, last_position]`.
    pub fn expected_frames(&self) -> u64 {
        let last = self.last_position();
        if last <= self.drop_threshold {
            return 0;
        }
        last / self.interval - self.drop_threshold / self.interval
    }

    /// Frames at or below this position are discarded.
    pub fn drop_threshold(&self) -> u64 {
        self.drop_threshold
    }

    /// Extraction stops at this position.
    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }

    /// Keep-one-in-N interval.
    pub fn interval(&self) -> u64 {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk positions the way the extractor does and count kept frames.
    fn simulate(sampler: &FrameSampler, stream_length: u64) -> (u64, StopReason) {
        let mut kept = 0;
        for position in 1..=stream_length {
            if sampler.decide(position) == SampleDecision::Keep {
                kept += 1;
            }
            if let Some(reason) = sampler.stop_after(position) {
                return (kept, reason);
            }
        }
        (kept, StopReason::EndOfStream)
    }

    #[test]
    fn hundred_frame_video() {
        let sampler = FrameSampler::new(10, 100, 3, 100).unwrap();
        let (kept, reason) = simulate(&sampler, 100);
        assert_eq!(kept, 30);
        assert_eq!(reason, StopReason::TotalFrames);
        assert_eq!(sampler.expected_frames(), 30);
    }

    #[test]
    fn invalid_range_rejected() {
        let error = FrameGifError::InvalidRange {
            drop_threshold: 10,
            end_frame: 10,
        };
        match FrameSampler::new(10, 10, 3, 100) {
            Err(actual) => assert_eq!(actual.to_string(), error.to_string()),
            Ok(_) => panic!("equal bounds must be rejected"),
        }
        assert!(FrameSampler::new(50, 20, 3, 100).is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(matches!(
            FrameSampler::new(0, 10, 0, 100),
            Err(FrameGifError::InvalidInterval)
        ));
    }

    #[test]
    fn end_bound_before_total() {
        let sampler = FrameSampler::new(0, 30, 3, 100).unwrap();
        let (kept, reason) = simulate(&sampler, 100);
        assert_eq!(kept, 10);
        assert_eq!(reason, StopReason::EndBound);
    }

    #[test]
    fn unknown_total_runs_to_end_of_stream() {
        let sampler = FrameSampler::new(0, 1_000, 3, 0).unwrap();
        let (kept, reason) = simulate(&sampler, 20);
        assert_eq!(kept, 6);
        assert_eq!(reason, StopReason::EndOfStream);
    }

    #[test]
    fn written_count_matches_formula_for_many_ranges() {
        for total in [0_u64, 1, 7, 50, 99] {
            for drop_threshold in 0..40 {
                for end_frame in (drop_threshold + 1)..80 {
                    for interval in 1..5 {
                        let sampler =
                            FrameSampler::new(drop_threshold, end_frame, interval, total).unwrap();
                        let stream_length = if total > 0 { total } else { end_frame };
                        let (kept, _) = simulate(&sampler, stream_length);
                        let upper = if total > 0 { end_frame.min(total) } else { end_frame };
                        let brute = ((drop_threshold + 1)..=upper)
                            .filter(|position| position % interval == 0)
                            .count() as u64;
                        assert_eq!(kept, brute);
                        assert_eq!(sampler.expected_frames(), brute);
                    }
                }
            }
        }
    }
}
