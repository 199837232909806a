//! FFmpeg CLI wrapper for the compilation pipeline.
//!
//! This crate provides:
//! - Type-safe ffmpeg command building with a stderr tail on failure
//! - Container probing via ffprobe
//! - Clip extraction with clean re-encoded cut points
//! - Ordered concatenation of clips into one compilation

pub mod clip;
pub mod command;
pub mod concat;
pub mod error;
pub mod probe;

pub use clip::{extract_clip, ClipFile};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::{assemble, Compilation};
pub use error::{AssemblyError, ClipError, MediaError, MediaResult};
pub use probe::{duration_secs, probe, MediaInfo};
