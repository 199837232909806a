//! Compilation assembly via the ffmpeg concat demuxer.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use timestitch_models::EncodingConfig;

use crate::clip::ClipFile;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::AssemblyError;

/// The single concatenated output built from all of one video's clips.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub path: PathBuf,
    pub clip_count: usize,
}

/// Concatenate `clips` into `output`, in the given order.
///
/// Clips are joined through the concat demuxer and re-encoded once with
/// the shared configuration; no reordering or deduplication happens here.
/// On success the output file exists and is non-empty. On failure any
/// partial output is removed, and the temporary list file is cleaned up
/// on every path.
pub async fn assemble(
    clips: &[ClipFile],
    output: &Path,
    encoding: &EncodingConfig,
) -> Result<Compilation, AssemblyError> {
    if clips.is_empty() {
        return Err(AssemblyError::NoClips);
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // The concat demuxer resolves relative entries against the list file's
    // own directory, so entries must be absolute.
    let mut entries = Vec::with_capacity(clips.len());
    for clip in clips {
        entries.push(std::fs::canonicalize(&clip.path)?);
    }

    let mut list_file = tempfile::Builder::new()
        .prefix("timestitch-concat-")
        .suffix(".txt")
        .tempfile()?;
    list_file.write_all(build_concat_list(&entries).as_bytes())?;
    list_file.flush()?;

    info!(
        clips = clips.len(),
        output = %output.display(),
        "assembling compilation"
    );

    let cmd = FfmpegCommand::new(list_file.path(), output)
        .input_format("concat")
        .input_args(["-safe", "0"])
        .encode_with(encoding);

    let run = FfmpegRunner::new().run(&cmd).await;
    // Dropping the guard unlinks the list file whether or not ffmpeg
    // succeeded.
    drop(list_file);

    if let Err(e) = run {
        remove_partial(output).await;
        return Err(AssemblyError::Encode(e));
    }

    match tokio::fs::metadata(output).await {
        Ok(meta) if meta.len() > 0 => Ok(Compilation {
            path: output.to_path_buf(),
            clip_count: clips.len(),
        }),
        _ => {
            remove_partial(output).await;
            Err(AssemblyError::EmptyOutput(output.to_path_buf()))
        }
    }
}

async fn remove_partial(output: &Path) {
    if let Err(e) = tokio::fs::remove_file(output).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %output.display(), error = %e, "failed to remove partial compilation");
        }
    }
}

/// Render a concat demuxer list: one `file '...'` entry per clip.
fn build_concat_list(paths: &[PathBuf]) -> String {
    let mut list = String::new();
    for path in paths {
        list.push_str("file '");
        list.push_str(&escape_concat_path(&path.to_string_lossy()));
        list.push_str("'\n");
    }
    list
}

/// Escape a path for a single-quoted concat list entry. The demuxer has
/// no in-quote escapes, so an embedded quote closes the string, emits an
/// escaped quote, and reopens it.
fn escape_concat_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}
