//! Working-directory layout for one video's run.
//!
//! Everything transient a video produces lives under one directory:
//!
//! ```text
//! <work_dir>/<video_id>/
//!     <video_id>.mp4              downloaded source (name up to provider)
//!     <video_id>_compilation.mp4  assembled output
//!     parts/                      one clip per segment
//! ```
//!
//! Clip names are deterministic functions of the segment, so a retried
//! pass overwrites instead of accumulating, and every path is known and
//! individually removable.

use std::path::{Path, PathBuf};
use tracing::warn;

use timestitch_models::{format_compact, Segment, VideoId};

/// Longest description slug embedded in a clip filename.
const SLUG_MAX_CHARS: usize = 30;

/// Path layout for one source video's transient files.
#[derive(Debug, Clone)]
pub struct VideoWorkspace {
    dir: PathBuf,
    video_id: VideoId,
}

impl VideoWorkspace {
    pub fn new(work_dir: impl AsRef<Path>, video_id: &VideoId) -> Self {
        Self {
            dir: work_dir.as_ref().join(video_id.as_str()),
            video_id: video_id.clone(),
        }
    }

    /// Root directory for this video.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding the per-segment clips.
    pub fn clips_dir(&self) -> PathBuf {
        self.dir.join("parts")
    }

    /// Create the directory tree.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.clips_dir()).await
    }

    /// Deterministic clip path for a segment, e.g.
    /// `parts/vid_02m00s_to_02m45s_tingles.mp4`.
    pub fn clip_path(&self, segment: &Segment) -> PathBuf {
        let name = format!(
            "{}_{}_to_{}_{}.mp4",
            self.video_id.as_str(),
            format_compact(segment.start_secs),
            format_compact(segment.end_secs),
            slug(&segment.description)
        );
        self.clips_dir().join(name)
    }

    /// Output path of the assembled compilation.
    pub fn compilation_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}_compilation.mp4", self.video_id.as_str()))
    }

    /// Remove the whole directory tree, best effort. Called on success,
    /// failure, and cancellation alike.
    pub async fn remove_all(&self) {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    video_id = %self.video_id,
                    dir = %self.dir.display(),
                    error = %e,
                    "failed to clean up workspace"
                );
            }
        }
    }
}

/// Reduce a description to a filename-safe slug.
fn slug(description: &str) -> String {
    let cleaned: String = description
        .chars()
        .take(SLUG_MAX_CHARS)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "clip".to_string()
    } else {
        cleaned
    }
}
