//! Time ranges and validated segments.

use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// Segments shorter than this after clamping are dropped rather than
/// encoded into sub-second stub clips.
pub const MIN_SEGMENT_SECS: f64 = 1.0;

/// A half-open `[start, end)` span inside a source video, as extracted
/// from one comment. Never mutated after creation; clamping produces a
/// new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Offset from the start of the video, in seconds.
    pub start_secs: f64,
    /// Exclusive end offset, in seconds.
    pub end_secs: f64,
    /// Free text the commenter attached to the span.
    pub description: String,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted spans.
    pub fn new(start_secs: f64, end_secs: f64, description: impl Into<String>) -> Option<Self> {
        if !(0.0..end_secs).contains(&start_secs) {
            return None;
        }
        Some(Self {
            start_secs,
            end_secs,
            description: description.into(),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Clamp the end of the range to the actual video duration.
    ///
    /// Returns `None` when the clamped span falls below
    /// [`MIN_SEGMENT_SECS`], including the case where the whole range
    /// lies beyond the end of the video.
    pub fn clamped_to(&self, duration_secs: f64) -> Option<Self> {
        let end_secs = self.end_secs.min(duration_secs);
        if end_secs - self.start_secs < MIN_SEGMENT_SECS {
            return None;
        }
        Some(Self {
            start_secs: self.start_secs,
            end_secs,
            description: self.description.clone(),
        })
    }
}

/// A keyword-matched, duration-clamped [`TimeRange`] bound to the video
/// it will be cut from. The unit of work for clip extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub video_id: VideoId,
    pub start_secs: f64,
    pub end_secs: f64,
    pub description: String,
}

impl Segment {
    pub fn new(video_id: VideoId, range: TimeRange) -> Self {
        Self {
            video_id,
            start_secs: range.start_secs,
            end_secs: range.end_secs,
            description: range.description,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Human-readable span for log lines, e.g. `00:02:00-00:02:45`.
    pub fn span(&self) -> String {
        format!(
            "{}-{}",
            crate::timestamp::format_seconds(self.start_secs),
            crate::timestamp::format_seconds(self.end_secs)
        )
    }
}
