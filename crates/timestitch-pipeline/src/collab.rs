//! Contracts for the external collaborators the pipeline depends on.
//!
//! The hosting platform's API surface (listing, comments, download,
//! upload) lives behind these traits; the pipeline never speaks HTTP
//! itself. Implementations are supplied by the embedding application,
//! and the test suite substitutes mocks.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use timestitch_models::{Comment, SourceVideo, VideoId};

use crate::config::Privacy;

/// Failures surfaced by any collaborator.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("rate limited by the platform")]
    RateLimited,

    #[error("authentication failed, operator intervention required")]
    AuthFailure,

    #[error("resource not found on the platform")]
    NotFound,

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Whether retrying the same call with backoff can help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable(_))
    }
}

/// Supplies candidate videos and their comments from the source channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// List videos worth considering on a channel or playlist, newest
    /// first.
    async fn list_candidate_videos(
        &self,
        channel_id: &str,
    ) -> Result<Vec<SourceVideo>, CollaboratorError>;

    /// Fetch the comments of one video.
    async fn list_comments(&self, video_id: &VideoId) -> Result<Vec<Comment>, CollaboratorError>;
}

/// Materializes a video's media as a complete local container file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Download the video into `dest_dir` and return the file path.
    async fn fetch_media(
        &self,
        video_id: &VideoId,
        dest_dir: &Path,
    ) -> Result<PathBuf, CollaboratorError>;
}

/// Everything to publish one compilation.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy: Privacy,
}

/// Publishes compilations to the destination channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload a compilation; returns the stable id of the new video.
    async fn publish(&self, request: UploadRequest) -> Result<String, CollaboratorError>;

    /// Look for an already-published derivative of `source_video` on the
    /// destination channel, by title convention. Guards against ledger
    /// loss without re-uploading.
    async fn find_existing(
        &self,
        source_video: &VideoId,
        title: &str,
    ) -> Result<Option<String>, CollaboratorError>;
}
