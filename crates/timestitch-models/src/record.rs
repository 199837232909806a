//! Durable processing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// One line of the processing ledger: a source video that has been fully
/// compiled and published. Records are append-only and never updated;
/// reprocessing is prevented by existence, not by state transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub source_video_id: VideoId,
    pub processed_at: DateTime<Utc>,
    /// Identifier of the published compilation, when the publish step ran
    /// in this process. Absent when the record was created because the
    /// destination channel already contained a derivative upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_video_id: Option<String>,
}

impl ProcessingRecord {
    pub fn new(source_video_id: VideoId, output_video_id: Option<String>) -> Self {
        Self {
            source_video_id,
            processed_at: Utc::now(),
            output_video_id,
        }
    }
}
