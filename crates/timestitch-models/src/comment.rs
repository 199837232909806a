//! Viewer comments fetched from the source channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single viewer comment. Read-only input; the pipeline only considers
/// comments whose author is on the configured allow-list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Display name of the comment author.
    pub author: String,
    /// Plain comment text, one timestamp per line by convention.
    pub text: String,
    pub published_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        author: impl Into<String>,
        text: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            published_at,
        }
    }
}
