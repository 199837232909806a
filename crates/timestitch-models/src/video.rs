//! Source video identity and metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a video on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A candidate video on the source channel, as reported by the video
/// metadata collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVideo {
    pub id: VideoId,
    pub title: String,
    /// Duration reported by the platform, in seconds. The clip extractor
    /// re-checks against the downloaded container, which is authoritative.
    pub duration_secs: f64,
}

impl SourceVideo {
    pub fn new(id: impl Into<VideoId>, title: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_secs,
        }
    }
}
