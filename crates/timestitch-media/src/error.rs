//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for low-level media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors from running ffmpeg/ffprobe.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH")]
    FfprobeNotFound,

    #[error("ffmpeg failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffprobe failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("not a usable video file: {0}")]
    InvalidVideo(String),

    #[error("encoder timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }
}

/// Failure of a single clip extraction. Aborts only that segment's
/// contribution to the compilation.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("segment starts at {start_secs:.1}s but the source is only {duration_secs:.1}s long")]
    OutOfRange { start_secs: f64, duration_secs: f64 },

    #[error("segment collapses to nothing against a {duration_secs:.1}s source")]
    EmptyRange { duration_secs: f64 },

    #[error("failed to cut clip: {0}")]
    Encode(#[source] MediaError),
}

/// Failure of the compilation step. Aborts the whole video's run.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no clips to assemble")]
    NoClips,

    #[error("failed to concatenate clips: {0}")]
    Encode(#[source] MediaError),

    #[error("assembled output {0} is missing or empty")]
    EmptyOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
