//! Clip extraction: one segment in, one encoded file out.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use timestitch_models::{EncodingConfig, Segment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::ClipError;
use crate::probe;

/// An encoded clip covering exactly one segment's span, living in the
/// pipeline's working directory until it is folded into a compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipFile {
    pub path: PathBuf,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl ClipFile {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Cut `[segment.start, segment.end)` out of `source` into `output`.
///
/// The source container is probed first and is authoritative: a start at
/// or past its end is [`ClipError::OutOfRange`], and the end offset is
/// re-clamped to the real duration. The cut is always re-encoded with the
/// given configuration so it lands exactly on the requested offsets
/// rather than on the nearest keyframe.
///
/// `output` is overwritten if present, which makes retried runs converge
/// on the same file. On failure any partial output is removed before the
/// error is returned; the source is never touched.
pub async fn extract_clip(
    source: &Path,
    segment: &Segment,
    output: &Path,
    encoding: &EncodingConfig,
) -> Result<ClipFile, ClipError> {
    let info = probe::probe(source).await.map_err(ClipError::Encode)?;

    if segment.start_secs >= info.duration_secs {
        return Err(ClipError::OutOfRange {
            start_secs: segment.start_secs,
            duration_secs: info.duration_secs,
        });
    }

    let end_secs = segment.end_secs.min(info.duration_secs);
    let length = end_secs - segment.start_secs;
    if length <= 0.0 {
        return Err(ClipError::EmptyRange {
            duration_secs: info.duration_secs,
        });
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ClipError::Encode(e.into()))?;
    }

    info!(
        video_id = %segment.video_id,
        span = %segment.span(),
        output = %output.display(),
        "extracting clip"
    );

    let cmd = FfmpegCommand::new(source, output)
        .seek(segment.start_secs)
        .limit(length)
        .encode_with(encoding);

    if let Err(e) = FfmpegRunner::new().run(&cmd).await {
        if let Err(rm) = tokio::fs::remove_file(output).await {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %output.display(), error = %rm, "failed to remove partial clip");
            }
        }
        return Err(ClipError::Encode(e));
    }

    Ok(ClipFile {
        path: output.to_path_buf(),
        start_secs: segment.start_secs,
        end_secs,
    })
}
