//! The per-video compilation pipeline.
//!
//! One pass walks the source channel's candidate videos sequentially and
//! takes each unprocessed one through parse → filter → extract → assemble
//! → publish → record. Videos are strictly one-at-a-time; the expensive
//! step is the encoder, not coordination.

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use timestitch_ledger::ProcessingLedger;
use timestitch_media::{assemble, extract_clip, ClipFile};
use timestitch_models::{Comment, EncodingConfig, Segment, SourceVideo, TimeRange, VideoId};
use timestitch_segments::{filter_segments, parser, FilterRules};

use crate::collab::{CollaboratorError, MediaProvider, Publisher, UploadRequest, VideoSource};
use crate::config::AppConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::paths::VideoWorkspace;
use crate::retry::{with_backoff, RetryConfig};
use crate::shutdown::Shutdown;
use crate::skiplist::SkipList;

/// Title length cap on the destination platform.
const MAX_TITLE_CHARS: usize = 100;

/// A compilation published during a pass.
#[derive(Debug, Clone)]
pub struct PublishedCompilation {
    pub source_video_id: VideoId,
    pub output_video_id: String,
    pub clip_count: usize,
}

/// What one pass did, per outcome.
#[derive(Debug)]
pub struct RunSummary {
    pub pass_id: Uuid,
    pub published: Vec<PublishedCompilation>,
    pub skipped_already_processed: usize,
    pub skipped_unavailable: usize,
    pub skipped_no_segments: usize,
    pub recorded_existing: usize,
    pub failed: usize,
}

impl RunSummary {
    fn new(pass_id: Uuid) -> Self {
        Self {
            pass_id,
            published: Vec::new(),
            skipped_already_processed: 0,
            skipped_unavailable: 0,
            skipped_no_segments: 0,
            recorded_existing: 0,
            failed: 0,
        }
    }
}

enum Outcome {
    Published {
        output_id: String,
        clip_count: usize,
    },
    /// Nothing matched the keyword rules (or no trusted commenter left
    /// timestamps). Not recorded; the video is reconsidered next pass.
    NoSegments,
    /// Segments existed but every extraction failed.
    ClipsFailed,
}

/// The compilation pipeline, wired to its collaborators.
pub struct Pipeline<S, M, P> {
    config: AppConfig,
    rules: FilterRules,
    encoding: EncodingConfig,
    retry: RetryConfig,
    ledger: ProcessingLedger,
    skiplist: SkipList,
    shutdown: Shutdown,
    source: S,
    media: M,
    publisher: P,
}

impl<S, M, P> Pipeline<S, M, P>
where
    S: VideoSource,
    M: MediaProvider,
    P: Publisher,
{
    pub fn new(
        config: AppConfig,
        ledger: ProcessingLedger,
        shutdown: Shutdown,
        source: S,
        media: M,
        publisher: P,
    ) -> Self {
        let rules = FilterRules::new(&config.keywords, &config.exclude_keywords);
        let skiplist = SkipList::new(config.skiplist_ttl);
        Self {
            rules,
            encoding: EncodingConfig::default(),
            retry: RetryConfig::default(),
            skiplist,
            config,
            ledger,
            shutdown,
            source,
            media,
            publisher,
        }
    }

    /// Override the encoding configuration.
    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    /// Override the backoff parameters used at collaborator call sites.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn ledger(&self) -> &ProcessingLedger {
        &self.ledger
    }

    /// Process every unhandled candidate video once.
    ///
    /// Individual video failures are logged and counted; the pass keeps
    /// going. Only authentication failure and shutdown end it early.
    pub async fn run_pass(&mut self) -> PipelineResult<RunSummary> {
        let pass_id = Uuid::new_v4();
        let mut summary = RunSummary::new(pass_id);

        info!(
            pass_id = %pass_id,
            channel = %self.config.channel_id,
            "starting compilation pass"
        );

        let videos = self.list_videos().await?;

        for video in videos {
            if self.shutdown.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            if self.skiplist.contains(&video.id) {
                summary.skipped_unavailable += 1;
                continue;
            }
            if self.ledger.has(&video.id) {
                debug!(video_id = %video.id, "already processed, skipping");
                summary.skipped_already_processed += 1;
                continue;
            }

            if self.config.duplicate_detection {
                match self.find_existing_upload(&video).await {
                    Ok(None) => {}
                    Ok(Some(existing_id)) => {
                        info!(
                            video_id = %video.id,
                            output_id = %existing_id,
                            "destination already has a derivative, recording it"
                        );
                        self.ledger.record(&video.id, Some(existing_id)).await?;
                        summary.recorded_existing += 1;
                        continue;
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(video_id = %video.id, error = %e, "duplicate check failed, deferring video");
                        summary.failed += 1;
                        continue;
                    }
                }
            }

            let span = info_span!("video", video_id = %video.id);
            match self.process_video(&video).instrument(span).await {
                Ok(Outcome::Published {
                    output_id,
                    clip_count,
                }) => {
                    summary.published.push(PublishedCompilation {
                        source_video_id: video.id.clone(),
                        output_video_id: output_id,
                        clip_count,
                    });
                }
                Ok(Outcome::NoSegments) => summary.skipped_no_segments += 1,
                Ok(Outcome::ClipsFailed) => summary.failed += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    if e.is_not_found() {
                        self.skiplist.note(&video.id);
                    }
                    error!(video_id = %video.id, error = %e, "video failed, moving on");
                    summary.failed += 1;
                }
            }
        }

        info!(
            pass_id = %pass_id,
            published = summary.published.len(),
            already_processed = summary.skipped_already_processed,
            no_segments = summary.skipped_no_segments,
            failed = summary.failed,
            "pass complete"
        );

        Ok(summary)
    }

    async fn list_videos(&self) -> PipelineResult<Vec<SourceVideo>> {
        let retry = self.retry_for("list_candidate_videos");
        let source = &self.source;
        let channel = self.config.channel_id.as_str();
        let mut videos = with_backoff(&retry, CollaboratorError::is_retryable, || {
            source.list_candidate_videos(channel)
        })
        .await?;

        if self.config.max_videos_per_pass > 0 {
            videos.truncate(self.config.max_videos_per_pass);
        }
        Ok(videos)
    }

    async fn find_existing_upload(
        &self,
        video: &SourceVideo,
    ) -> PipelineResult<Option<String>> {
        let title = compilation_title(&self.config.title_prefix, &video.title);
        let retry = self.retry_for("find_existing");
        let publisher = &self.publisher;
        let existing = with_backoff(&retry, CollaboratorError::is_retryable, || {
            publisher.find_existing(&video.id, &title)
        })
        .await?;
        Ok(existing)
    }

    async fn process_video(&mut self, video: &SourceVideo) -> PipelineResult<Outcome> {
        let comments = {
            let retry = self.retry_for("list_comments");
            let source = &self.source;
            with_backoff(&retry, CollaboratorError::is_retryable, || {
                source.list_comments(&video.id)
            })
            .await?
        };

        let (ranges, skipped_lines) = collect_ranges(&self.config, &comments);
        if skipped_lines > 0 {
            debug!(skipped_lines, "ignored malformed timestamp lines");
        }

        let segments = filter_segments(&video.id, video.duration_secs, ranges, &self.rules);
        if segments.is_empty() {
            info!("no segments matched, leaving video for a later pass");
            return Ok(Outcome::NoSegments);
        }
        info!(segments = segments.len(), "segments selected");

        let workspace = VideoWorkspace::new(&self.config.work_dir, &video.id);
        workspace.ensure().await?;

        let result = self.compile_and_publish(video, &segments, &workspace).await;
        // Transient files go away on success, failure, and cancellation.
        workspace.remove_all().await;
        result
    }

    async fn compile_and_publish(
        &mut self,
        video: &SourceVideo,
        segments: &[Segment],
        workspace: &VideoWorkspace,
    ) -> PipelineResult<Outcome> {
        let source_path = {
            let retry = self.retry_for("fetch_media");
            let media = &self.media;
            let dest = workspace.dir();
            with_backoff(&retry, CollaboratorError::is_retryable, || {
                media.fetch_media(&video.id, dest)
            })
            .await?
        };

        let mut clips: Vec<ClipFile> = Vec::with_capacity(segments.len());
        for segment in segments {
            if self.shutdown.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            let clip_path = workspace.clip_path(segment);
            match extract_clip(&source_path, segment, &clip_path, &self.encoding).await {
                Ok(clip) => clips.push(clip),
                Err(e) => {
                    warn!(
                        span = %segment.span(),
                        error = %e,
                        "segment failed, leaving it out of the compilation"
                    );
                }
            }
        }

        if clips.is_empty() {
            warn!("every segment failed to extract, deferring video");
            return Ok(Outcome::ClipsFailed);
        }
        if self.shutdown.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let compilation = assemble(&clips, &workspace.compilation_path(), &self.encoding).await?;

        let request = UploadRequest {
            path: compilation.path.clone(),
            title: compilation_title(&self.config.title_prefix, &video.title),
            description: compilation_description(video),
            tags: self.config.tags.clone(),
            privacy: self.config.privacy,
        };
        let output_id = {
            let retry = self.retry_for("publish");
            let publisher = &self.publisher;
            with_backoff(&retry, CollaboratorError::is_retryable, || {
                publisher.publish(request.clone())
            })
            .await?
        };

        self.ledger.record(&video.id, Some(output_id.clone())).await?;

        info!(
            output_id = %output_id,
            clips = clips.len(),
            "compilation published and recorded"
        );

        Ok(Outcome::Published {
            output_id,
            clip_count: clips.len(),
        })
    }

    fn retry_for(&self, operation: &'static str) -> RetryConfig {
        RetryConfig {
            operation,
            ..self.retry.clone()
        }
    }
}

/// Collect candidate ranges from every trusted comment, preserving
/// comment order so later tie-breaking stays deterministic.
fn collect_ranges(config: &AppConfig, comments: &[Comment]) -> (Vec<TimeRange>, usize) {
    let mut ranges = Vec::new();
    let mut skipped = 0;
    for comment in comments
        .iter()
        .filter(|c| config.is_trusted_commenter(&c.author))
    {
        let mut scan = parser::scan(&comment.text);
        ranges.extend(scan.by_ref());
        skipped += scan.skipped();
    }
    (ranges, skipped)
}

/// Title of the published compilation, truncated to the platform cap.
fn compilation_title(prefix: &str, source_title: &str) -> String {
    let title = format!("{prefix} {source_title}");
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title;
    }
    let mut truncated: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}

fn compilation_description(video: &SourceVideo) -> String {
    format!(
        "Compilation of viewer-highlighted moments from \"{}\" (source video {}).",
        video.title, video.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use crate::collab::{MockMediaProvider, MockPublisher, MockVideoSource};
    use crate::shutdown::shutdown_channel;

    fn test_config(dir: &Path, extra: &[(&'static str, &str)]) -> AppConfig {
        let work = dir.join("work").to_string_lossy().into_owned();
        let ledger = dir.join("ledger.jsonl").to_string_lossy().into_owned();
        AppConfig::from_lookup(|name| {
            if let Some((_, value)) = extra.iter().find(|(n, _)| *n == name) {
                return Some(value.to_string());
            }
            match name {
                "CHANNEL_ID" => Some("chan".to_string()),
                "TIMESTAMP_COMMENTERS" => Some("alice".to_string()),
                "KEYWORDS" => Some("tingles".to_string()),
                "WORK_DIR" => Some(work.clone()),
                "LEDGER_PATH" => Some(ledger.clone()),
                _ => None,
            }
        })
        .unwrap()
    }

    async fn build_pipeline(
        config: AppConfig,
        shutdown: Shutdown,
        source: MockVideoSource,
        media: MockMediaProvider,
        publisher: MockPublisher,
    ) -> Pipeline<MockVideoSource, MockMediaProvider, MockPublisher> {
        let ledger = ProcessingLedger::open(&config.ledger_path).await.unwrap();
        Pipeline::new(config, ledger, shutdown, source, media, publisher).with_retry(
            RetryConfig::new("test")
                .with_base_delay(Duration::from_millis(1))
                .with_max_retries(2),
        )
    }

    fn video(id: &str) -> SourceVideo {
        SourceVideo::new(id, format!("Video {id}"), 600.0)
    }

    fn comment(author: &str, text: &str) -> Comment {
        Comment::new(author, text, Utc::now())
    }

    #[tokio::test]
    async fn ledger_hits_skip_all_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[]);

        let mut ledger = ProcessingLedger::open(&config.ledger_path).await.unwrap();
        ledger
            .record(&VideoId::from("done1"), Some("out1".to_string()))
            .await
            .unwrap();

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .returning(|_| Ok(vec![video("done1")]));
        // No comment, media, or publish expectations: any such call panics.

        let mut pipeline = Pipeline::new(
            config,
            ledger,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        );

        let summary = pipeline.run_pass().await.unwrap();
        assert_eq!(summary.skipped_already_processed, 1);
        assert!(summary.published.is_empty());
    }

    #[tokio::test]
    async fn duplicate_detection_records_without_processing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[]);

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .returning(|_| Ok(vec![video("vid1")]));

        let mut publisher = MockPublisher::new();
        publisher
            .expect_find_existing()
            .times(1)
            .returning(|_, _| Ok(Some("existing9".to_string())));

        let mut pipeline = build_pipeline(
            config,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            publisher,
        )
        .await;

        let summary = pipeline.run_pass().await.unwrap();
        assert_eq!(summary.recorded_existing, 1);
        assert!(pipeline.ledger().has(&VideoId::from("vid1")));
        assert_eq!(
            pipeline.ledger().records()[0].output_video_id.as_deref(),
            Some("existing9")
        );
    }

    #[tokio::test]
    async fn untrusted_or_unmatched_comments_leave_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[("DUPLICATE_DETECTION", "false")]);

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .returning(|_| Ok(vec![video("vid1")]));
        source.expect_list_comments().times(1).returning(|_| {
            Ok(vec![
                // Untrusted author with perfect timestamps.
                comment("mallory", "2:00 intro\n2:45 tingles"),
                // Trusted author, but nothing matches the keyword.
                comment("alice", "1:00 talking\n1:30 more talking"),
            ])
        });

        let mut pipeline = build_pipeline(
            config,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        )
        .await;

        let summary = pipeline.run_pass().await.unwrap();
        assert_eq!(summary.skipped_no_segments, 1);
        assert!(!pipeline.ledger().has(&VideoId::from("vid1")));
    }

    #[tokio::test]
    async fn rate_limited_listing_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[]);

        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut source = MockVideoSource::new();
        source.expect_list_candidate_videos().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CollaboratorError::RateLimited)
            } else {
                Ok(vec![])
            }
        });

        let mut pipeline = build_pipeline(
            config,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        )
        .await;

        let summary = pipeline.run_pass().await.unwrap();
        assert!(summary.published.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn vanished_videos_are_skiplisted_for_later_passes() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[("DUPLICATE_DETECTION", "false")]);

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .times(2)
            .returning(|_| Ok(vec![video("ghost")]));
        source
            .expect_list_comments()
            .times(1)
            .returning(|_| Err(CollaboratorError::NotFound));

        let mut pipeline = build_pipeline(
            config,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        )
        .await;

        let first = pipeline.run_pass().await.unwrap();
        assert_eq!(first.failed, 1);
        assert!(!pipeline.ledger().has(&VideoId::from("ghost")));

        // Next pass: the id is parked, the API is not asked again.
        let second = pipeline.run_pass().await.unwrap();
        assert_eq!(second.skipped_unavailable, 1);
        assert_eq!(second.failed, 0);
    }

    #[tokio::test]
    async fn auth_failure_aborts_the_whole_pass() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[("DUPLICATE_DETECTION", "false")]);

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .returning(|_| Ok(vec![video("vid1"), video("vid2")]));
        source
            .expect_list_comments()
            .times(1)
            .returning(|_| Err(CollaboratorError::AuthFailure));

        let mut pipeline = build_pipeline(
            config,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        )
        .await;

        let err = pipeline.run_pass().await.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            PipelineError::Collaborator(CollaboratorError::AuthFailure)
        ));
    }

    #[tokio::test]
    async fn shutdown_stops_before_the_first_video() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[]);

        let (handle, shutdown) = shutdown_channel();
        handle.shutdown();

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .returning(|_| Ok(vec![video("vid1")]));

        let mut pipeline = build_pipeline(
            config,
            shutdown,
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        )
        .await;

        let err = pipeline.run_pass().await.unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn pass_cap_limits_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            dir.path(),
            &[("DUPLICATE_DETECTION", "false"), ("MAX_VIDEOS_PER_PASS", "1")],
        );

        let mut source = MockVideoSource::new();
        source
            .expect_list_candidate_videos()
            .returning(|_| Ok(vec![video("vid1"), video("vid2")]));
        // Only the first video may be touched.
        source
            .expect_list_comments()
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut pipeline = build_pipeline(
            config,
            Shutdown::never(),
            source,
            MockMediaProvider::new(),
            MockPublisher::new(),
        )
        .await;

        let summary = pipeline.run_pass().await.unwrap();
        assert_eq!(summary.skipped_no_segments, 1);
    }

    #[test]
    fn titles_are_truncated_to_the_platform_cap() {
        let title = compilation_title("[Compilation]", &"x".repeat(200));
        assert_eq!(title.chars().count(), 100);
        assert!(title.ends_with("..."));

        let short = compilation_title("[Compilation]", "Rain sounds");
        assert_eq!(short, "[Compilation] Rain sounds");
    }

    #[test]
    fn range_collection_respects_the_allow_list_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &[]);

        let comments = vec![
            comment("alice", "2:00 intro\n2:45 tingles"),
            comment("mallory", "1:00 a\n1:30 b"),
            comment("alice", "4:00 start\n4:30 tingles again\nbroken 5:00"),
        ];
        let (ranges, skipped) = collect_ranges(&config, &comments);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start_secs, 120.0);
        assert_eq!(ranges[1].start_secs, 240.0);
        assert_eq!(skipped, 0);
    }
}
