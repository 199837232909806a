//! Shared data models for the timestitch pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Source videos and their comments
//! - Time ranges and validated segments
//! - Encoding configuration
//! - Durable processing records

pub mod comment;
pub mod encoding;
pub mod range;
pub mod record;
pub mod timestamp;
pub mod video;

// Re-export common types
pub use comment::Comment;
pub use encoding::EncodingConfig;
pub use range::{Segment, TimeRange, MIN_SEGMENT_SECS};
pub use record::ProcessingRecord;
pub use timestamp::{format_compact, format_seconds, parse_token, TimestampError};
pub use video::{SourceVideo, VideoId};
