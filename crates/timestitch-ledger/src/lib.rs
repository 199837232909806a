//! Durable record of which source videos have been fully processed.
//!
//! The ledger is a JSONL append log replayed into an in-memory set on
//! open. Existence of a record is the only state that matters: a video is
//! either done or it is not, and failed runs leave nothing behind, so a
//! crash anywhere before the final append is recovered by simply running
//! again.

mod error;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use timestitch_models::{ProcessingRecord, VideoId};

pub use error::LedgerError;

/// Append-only ledger of processed videos, keyed by source video id.
#[derive(Debug)]
pub struct ProcessingLedger {
    path: PathBuf,
    index: HashSet<String>,
    records: Vec<ProcessingRecord>,
}

impl ProcessingLedger {
    /// Open a ledger file, creating it (and its parent directories) if
    /// absent, and replay its records into the membership index.
    ///
    /// Unparseable lines are logged and skipped: the only way one occurs
    /// is a crash that tore the final append before it was synced, and
    /// the affected video simply gets reprocessed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| LedgerError::Open {
                        path: path.clone(),
                        source,
                    })?;
            }
        }

        let mut index = HashSet::new();
        let mut records = Vec::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                if !contents.is_empty() && !contents.ends_with('\n') {
                    // A torn final append would otherwise merge with the
                    // next record written.
                    let mut file = tokio::fs::OpenOptions::new()
                        .append(true)
                        .open(&path)
                        .await
                        .map_err(|source| LedgerError::Open {
                            path: path.clone(),
                            source,
                        })?;
                    file.write_all(b"\n")
                        .await
                        .map_err(|source| LedgerError::Open {
                            path: path.clone(),
                            source,
                        })?;
                }
                for (line_no, line) in contents.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ProcessingRecord>(line) {
                        Ok(record) => {
                            index.insert(record.source_video_id.as_str().to_string());
                            records.push(record);
                        }
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                line = line_no + 1,
                                error = %e,
                                "skipping unreadable ledger line"
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(LedgerError::Open {
                    path: path.clone(),
                    source,
                })
            }
        }

        debug!(path = %path.display(), records = records.len(), "ledger opened");

        Ok(Self {
            path,
            index,
            records,
        })
    }

    /// Whether a source video has already been processed. The primary
    /// idempotence guard, checked before any work begins.
    pub fn has(&self, id: &VideoId) -> bool {
        self.index.contains(id.as_str())
    }

    /// Durably record a source video as processed.
    ///
    /// The record is appended as one line and synced before this returns;
    /// afterwards `has` answers true even across a restart. Recording an
    /// id that is already present is a no-op.
    pub async fn record(
        &mut self,
        id: &VideoId,
        output_video_id: Option<String>,
    ) -> Result<(), LedgerError> {
        if self.has(id) {
            debug!(video_id = %id, "ledger already contains id, skipping append");
            return Ok(());
        }

        let record = ProcessingRecord::new(id.clone(), output_video_id);
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(LedgerError::Write)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(LedgerError::Write)?;
        file.flush().await.map_err(LedgerError::Write)?;
        file.sync_data().await.map_err(LedgerError::Write)?;

        self.index.insert(id.as_str().to_string());
        self.records.push(record);
        Ok(())
    }

    /// All records replayed or appended so far, in log order.
    pub fn records(&self) -> &[ProcessingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("data").join("processed.jsonl")
    }

    #[tokio::test]
    async fn recorded_ids_are_members() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ProcessingLedger::open(ledger_path(&dir)).await.unwrap();

        let id = VideoId::from("vid1");
        assert!(!ledger.has(&id));

        ledger.record(&id, Some("out1".to_string())).await.unwrap();
        assert!(ledger.has(&id));
        assert!(!ledger.has(&VideoId::from("vid2")));
    }

    #[tokio::test]
    async fn membership_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = ledger_path(&dir);

        {
            let mut ledger = ProcessingLedger::open(&path).await.unwrap();
            ledger
                .record(&VideoId::from("vid1"), Some("out1".to_string()))
                .await
                .unwrap();
            ledger.record(&VideoId::from("vid2"), None).await.unwrap();
        }

        let reopened = ProcessingLedger::open(&path).await.unwrap();
        assert!(reopened.has(&VideoId::from("vid1")));
        assert!(reopened.has(&VideoId::from("vid2")));
        assert_eq!(reopened.len(), 2);
        assert_eq!(
            reopened.records()[0].output_video_id.as_deref(),
            Some("out1")
        );
    }

    #[tokio::test]
    async fn double_record_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = ledger_path(&dir);

        let mut ledger = ProcessingLedger::open(&path).await.unwrap();
        let id = VideoId::from("vid1");
        ledger.record(&id, Some("out1".to_string())).await.unwrap();
        ledger.record(&id, Some("out2".to_string())).await.unwrap();

        assert!(ledger.has(&id));
        assert_eq!(ledger.len(), 1);

        // And only one line on disk.
        let reopened = ProcessingLedger::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(
            reopened.records()[0].output_video_id.as_deref(),
            Some("out1")
        );
    }

    #[tokio::test]
    async fn torn_trailing_line_is_skipped_on_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = ledger_path(&dir);

        let mut ledger = ProcessingLedger::open(&path).await.unwrap();
        ledger
            .record(&VideoId::from("vid1"), Some("out1".to_string()))
            .await
            .unwrap();
        drop(ledger);

        // Simulate a crash mid-append.
        let mut contents = tokio::fs::read_to_string(&path).await.unwrap();
        contents.push_str("{\"source_video_id\":\"vid2\",\"proc");
        tokio::fs::write(&path, contents).await.unwrap();

        let mut reopened = ProcessingLedger::open(&path).await.unwrap();
        assert!(reopened.has(&VideoId::from("vid1")));
        assert!(!reopened.has(&VideoId::from("vid2")));

        // The torn video can be recorded again after its rerun, and the
        // new record is readable on the next replay.
        reopened
            .record(&VideoId::from("vid2"), Some("out2".to_string()))
            .await
            .unwrap();
        assert!(reopened.has(&VideoId::from("vid2")));

        let replayed = ProcessingLedger::open(&path).await.unwrap();
        assert!(replayed.has(&VideoId::from("vid1")));
        assert!(replayed.has(&VideoId::from("vid2")));
        assert_eq!(replayed.len(), 2);
    }
}
